//! Full provisioning: a fixed sequence of tasks.

use crate::error::Result;
use crate::tasks::{
    dotfiles, firewall, motd, mpd, packages, python, run_named, TaskContext,
};

/// Installs pretty much everything to a bare board.
///
/// The order is the contract: a failure anywhere aborts the remaining
/// sequence, and the error names the task that stopped it.
pub async fn deploy(ctx: &TaskContext) -> Result<()> {
    ctx.reporter.task("Starting deployment");
    run_named("upgrade-packages", packages::upgrade_packages(ctx)).await?;
    run_named("setup-packages", packages::setup_packages(ctx)).await?;
    run_named("install-firewall", firewall::install_firewall(ctx)).await?;
    run_named("setup-python", python::setup_python(ctx)).await?;
    run_named("install-dotfiles", dotfiles::install_dotfiles(ctx)).await?;
    run_named("install-mpd", mpd::install_mpd(ctx)).await?;
    run_named("install-motd", motd::install_motd(ctx)).await?;
    Ok(())
}
