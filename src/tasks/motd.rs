//! Message-of-the-day installation.

use minijinja::context;

use crate::error::Result;
use crate::fs;
use crate::tasks::TaskContext;
use crate::template;

/// Where the banner lands on the target.
pub const MOTD_PATH: &str = "/etc/motd";

/// Render the colour ASCII-art banner.
///
/// The raspberry was drawn by RPi forum user b3n,
/// http://www.raspberrypi.org/phpBB3/viewtopic.php?f=2&t=5494
pub fn render_banner() -> Result<String> {
    template::render(
        "motd",
        context! {
            green => "\u{1b}[32m",
            red => "\u{1b}[31m",
            blue => "\u{1b}[34m",
            orange => "\u{1b}[33m",
            purple => "\u{1b}[35m",
            reset => "\u{1b}[m",
        },
    )
}

/// Installs a succulent ascii-art MOTD. In colour!
pub async fn install_motd(ctx: &TaskContext) -> Result<()> {
    ctx.reporter.task("Installing succulent MOTD");
    let banner = render_banner()?;
    fs::write_file(&ctx.target, MOTD_PATH, &banner, 0o644).await
}
