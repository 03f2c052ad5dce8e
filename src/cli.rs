//! Command-line interface for piforge.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// piforge - remote provisioning for single-board computers
#[derive(Parser, Debug, Clone)]
#[command(name = "piforge")]
#[command(version)]
#[command(about = "Remote provisioning for single-board computers", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Target host to provision
    #[arg(short = 'H', long, global = true, env = "PIFORGE_HOST")]
    pub host: Option<String>,

    /// Login user on the target
    #[arg(short, long, global = true, env = "PIFORGE_USER")]
    pub user: Option<String>,

    /// SSH port
    #[arg(short, long, global = true, env = "PIFORGE_PORT")]
    pub port: Option<u16>,

    /// Path to an SSH identity file
    #[arg(short = 'i', long, global = true, env = "PIFORGE_IDENTITY")]
    pub identity: Option<PathBuf>,

    /// Privilege escalation method (sudo, su, doas)
    #[arg(long, global = true)]
    pub become_method: Option<String>,

    /// Provision the local machine instead of connecting over SSH
    #[arg(long, global = true)]
    pub local: bool,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true, env = "PIFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Install pretty much everything onto a bare board
    Deploy,

    /// Install the base package set
    SetupPackages,

    /// Update, upgrade, and clean all packages
    UpgradePackages,

    /// Install ufw and open SSH access to everyone
    InstallFirewall,

    /// Allow everyone access to the specified TCP port
    OpenPort {
        /// Port to open
        port: u16,
    },

    /// Configure a generic USB WiFi device for DHCP
    InstallWifi {
        /// Network name
        ssid: String,
        /// Pre-shared key
        psk: String,
    },

    /// Install the colour ASCII-art message of the day
    InstallMotd,

    /// Install MPD and configure it for the 3.5mm audio output
    InstallMpd,

    /// Copy dotfiles from the configured repository into the home directory
    InstallDotfiles,

    /// Install virtualenvwrapper and common global python packages
    SetupPython,

    /// Update the board firmware
    UpdateFirmware,

    /// Show general stats about the board
    Status,

    /// Reboot the board
    Reboot,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-3)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(3)
    }
}
