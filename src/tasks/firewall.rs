//! Firewall installation and port rules via ufw.

use crate::command::Cmd;
use crate::error::Result;
use crate::pkg;
use crate::tasks::TaskContext;

/// Installs ufw and opens ssh access to everyone.
pub async fn install_firewall(ctx: &TaskContext) -> Result<()> {
    ctx.reporter.task("Installing/configuring firewall");
    pkg::ensure(ctx, "ufw").await?;
    allow_port(ctx, 22).await?;
    enable(ctx).await?;
    Ok(())
}

/// Adds a firewall rule to allow everyone access to the specified port.
pub async fn open_port(ctx: &TaskContext, port: u16) -> Result<()> {
    ctx.reporter
        .task(&format!("Configuring firewall to allow all on port {}", port));
    install_firewall(ctx).await?;
    allow_port(ctx, port).await?;
    enable(ctx).await?;
    Ok(())
}

/// Allow TCP traffic from anywhere to `port`.
pub(crate) async fn allow_port(ctx: &TaskContext, port: u16) -> Result<()> {
    ctx.target
        .run_privileged(
            &Cmd::new("ufw")
                .args(["allow", "proto", "tcp", "from", "any", "to", "any", "port"])
                .arg(port.to_string()),
        )
        .await?;
    Ok(())
}

/// Enable the firewall without the interactive confirmation prompt.
pub(crate) async fn enable(ctx: &TaskContext) -> Result<()> {
    ctx.target
        .run_privileged(&Cmd::new("ufw").args(["--force", "enable"]))
        .await?;
    Ok(())
}
