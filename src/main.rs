//! piforge - remote provisioning for single-board computers
//!
//! This is the main entry point for the piforge CLI.

mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::CommandFactory;
use cli::{Cli, Commands};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use piforge::config::Config;
use piforge::connection::{Connection, LocalConnection, SshAuth, SshConnection};
use piforge::output::Reporter;
use piforge::tasks::{self, run_named, TaskContext};
use piforge::{Error, Escalation, Target};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(cli.verbosity());

    if let Commands::Completions { shell } = &cli.command {
        let mut command = Cli::command();
        clap_complete::generate(*shell, &mut command, "piforge", &mut std::io::stdout());
        return Ok(());
    }

    let reporter = Reporter::new(!cli.no_color);

    match run(&cli, reporter).await {
        Ok(()) => Ok(()),
        Err(e) => {
            match e.task() {
                Some(task) => reporter.error(&format!("piforge: task '{}' failed", task)),
                None => reporter.error("piforge: failed"),
            }
            reporter.error(&format!("{}", e));
            std::process::exit(e.exit_code());
        }
    }
}

/// Build the target from configuration and run the requested task.
async fn run(cli: &Cli, reporter: Reporter) -> piforge::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;

    // CLI flags override file configuration
    if let Some(host) = &cli.host {
        config.target.host = Some(host.clone());
    }
    if let Some(user) = &cli.user {
        config.target.user = user.clone();
    }
    if let Some(port) = cli.port {
        config.target.port = port;
    }
    if let Some(identity) = &cli.identity {
        config.target.identity_file = Some(identity.to_string_lossy().into_owned());
    }
    if let Some(method) = &cli.become_method {
        config.escalation.method = method.clone();
    }

    let connection: Arc<dyn Connection> = if cli.local {
        Arc::new(LocalConnection::new())
    } else {
        let host = config
            .target
            .host
            .clone()
            .ok_or_else(|| Error::Config("no target host configured (use --host)".to_string()))?;
        let auth = SshAuth {
            identity_file: config.identity_path(),
            connect_timeout: std::time::Duration::from_secs(config.target.connect_timeout),
            ..SshAuth::default()
        };
        Arc::new(
            SshConnection::connect(&host, config.target.port, &config.target.user, &auth).await?,
        )
    };

    let escalation = Escalation {
        method: config.escalation.method.clone(),
        user: config.escalation.user.clone(),
    };
    let target = Target::new(connection, escalation);
    let ctx = TaskContext::new(target, config.dotfiles.clone(), reporter);

    dispatch(&cli.command, &ctx).await?;

    let _ = ctx.target.connection().close().await;
    Ok(())
}

/// Route a subcommand to its task.
async fn dispatch(command: &Commands, ctx: &TaskContext) -> piforge::Result<()> {
    match command {
        Commands::Deploy => run_named("deploy", tasks::deploy::deploy(ctx)).await,
        Commands::SetupPackages => {
            run_named("setup-packages", tasks::packages::setup_packages(ctx)).await
        }
        Commands::UpgradePackages => {
            run_named("upgrade-packages", tasks::packages::upgrade_packages(ctx)).await
        }
        Commands::InstallFirewall => {
            run_named("install-firewall", tasks::firewall::install_firewall(ctx)).await
        }
        Commands::OpenPort { port } => {
            run_named("open-port", tasks::firewall::open_port(ctx, *port)).await
        }
        Commands::InstallWifi { ssid, psk } => {
            run_named("install-wifi", tasks::wifi::install_wifi(ctx, ssid, psk)).await
        }
        Commands::InstallMotd => run_named("install-motd", tasks::motd::install_motd(ctx)).await,
        Commands::InstallMpd => run_named("install-mpd", tasks::mpd::install_mpd(ctx)).await,
        Commands::InstallDotfiles => {
            run_named("install-dotfiles", tasks::dotfiles::install_dotfiles(ctx)).await
        }
        Commands::SetupPython => run_named("setup-python", tasks::python::setup_python(ctx)).await,
        Commands::UpdateFirmware => {
            run_named("update-firmware", tasks::firmware::update_firmware(ctx)).await
        }
        Commands::Status => run_named("status", tasks::system::status(ctx)).await,
        Commands::Reboot => run_named("reboot", tasks::system::reboot(ctx)).await,
        Commands::Completions { .. } => unreachable!("handled before connecting"),
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(verbosity >= 3))
        .with(env_filter)
        .init();
}
