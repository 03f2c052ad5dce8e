//! General board housekeeping: status and reboot.

use crate::command::Cmd;
use crate::error::Result;
use crate::tasks::TaskContext;

/// General stats about the board.
pub async fn status(ctx: &TaskContext) -> Result<()> {
    let commands = [
        Cmd::new("mpc"),
        Cmd::new("uptime"),
        Cmd::new("df").arg("-h"),
    ];
    for cmd in &commands {
        let result = ctx.target.run(cmd).await?;
        ctx.reporter.command_output(&result.stdout);
    }
    Ok(())
}

/// Reboots. Yup.
pub async fn reboot(ctx: &TaskContext) -> Result<()> {
    ctx.reporter.alert("Rebooting");
    ctx.target.run_privileged(&Cmd::new("reboot")).await?;
    Ok(())
}
