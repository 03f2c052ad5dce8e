//! MPD installation and configuration.

use minijinja::context;

use crate::command::Cmd;
use crate::error::Result;
use crate::fs;
use crate::pkg;
use crate::tasks::{firewall, TaskContext};
use crate::template;

/// MPD configuration path on the target.
pub const MPD_CONF_PATH: &str = "/etc/mpd.conf";

/// Port MPD listens on, opened to everyone.
pub const MPD_PORT: u16 = 6600;

/// Installs MPD and configures it for the 3.5mm audio output.
/// Allows passwordless connection from any host on port 6600.
pub async fn install_mpd(ctx: &TaskContext) -> Result<()> {
    ctx.reporter.task("Installing MPD");

    let conf = template::render(
        "mpd.conf",
        context! { port => MPD_PORT, zeroconf_name => "Raspberry Pi" },
    )?;

    pkg::ensure(ctx, "mpc").await?;
    pkg::ensure(ctx, "mpd").await?;
    pkg::ensure(ctx, "ufw").await?;

    firewall::allow_port(ctx, MPD_PORT).await?;
    firewall::enable(ctx).await?;

    fs::write_file(&ctx.target, MPD_CONF_PATH, &conf, 0o644).await?;

    ctx.target
        .run_privileged(&Cmd::new("systemctl").args(["restart", "mpd"]))
        .await?;
    Ok(())
}
