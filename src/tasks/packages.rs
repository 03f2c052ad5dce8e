//! Base package installation and full upgrades.

use crate::command::Cmd;
use crate::error::Result;
use crate::pkg;
use crate::tasks::TaskContext;

/// Packages every board gets.
const BASE_PACKAGES: &[&str] = &[
    "git-core",
    "mpc",
    "mpd",
    // Sometimes screen, sometimes tmux ...
    "screen",
    "tmux",
    // ... but always vim.
    "vim",
    "python3-pip",
    "ack-grep",
];

const ACK_LINK: &str = "/usr/local/bin/ack";
const FFIND_URL: &str = "https://raw.github.com/sjl/friendly-find/master/ffind";
const FFIND_DEST: &str = "/usr/local/bin/ffind";

/// Installs the basic package requirements.
pub async fn setup_packages(ctx: &TaskContext) -> Result<()> {
    ctx.reporter.task("Installing packages");
    pkg::update(ctx).await?;

    for name in BASE_PACKAGES {
        pkg::ensure(ctx, name).await?;
    }

    // Debian ships the binary as ack-grep; expose it as plain `ack`
    if ctx.target.file_exists(ACK_LINK).await? {
        ctx.target
            .run_privileged(&Cmd::new("rm").arg(ACK_LINK))
            .await?;
    }
    ctx.target
        .run_privileged(&Cmd::new("ln").args(["-s", "/usr/bin/ack-grep", ACK_LINK]))
        .await?;

    pkg::install_binary_from_url(ctx, FFIND_URL, FFIND_DEST).await?;
    Ok(())
}

/// Updates, upgrades, and cleans all packages.
pub async fn upgrade_packages(ctx: &TaskContext) -> Result<()> {
    pkg::update(ctx).await?;
    ctx.reporter.task("Upgrading all packages");
    pkg::upgrade(ctx).await?;
    pkg::clean(ctx).await?;
    Ok(())
}
