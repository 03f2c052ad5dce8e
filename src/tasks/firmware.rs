//! Firmware updates via rpi-update.

use crate::command::Cmd;
use crate::error::Result;
use crate::pkg;
use crate::tasks::TaskContext;

const RPI_UPDATE_URL: &str =
    "https://raw.githubusercontent.com/Hexxeh/rpi-update/master/rpi-update";
const RPI_UPDATE_DEST: &str = "/usr/bin/rpi-update";

/// Updates firmware. See https://github.com/Hexxeh/rpi-update for more
/// information.
pub async fn update_firmware(ctx: &TaskContext) -> Result<()> {
    pkg::update(ctx).await?;
    ctx.reporter.alert("Updating firmware");
    pkg::ensure(ctx, "ca-certificates").await?;
    pkg::install_binary_from_url(ctx, RPI_UPDATE_URL, RPI_UPDATE_DEST).await?;
    ctx.target.run_privileged(&Cmd::new("rpi-update")).await?;
    Ok(())
}
