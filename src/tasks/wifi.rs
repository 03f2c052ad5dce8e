//! USB WiFi configuration.

use minijinja::context;

use crate::command::Cmd;
use crate::error::Result;
use crate::fs;
use crate::tasks::TaskContext;
use crate::template;

/// Network interface configuration written by [`install_wifi`].
pub const INTERFACES_PATH: &str = "/etc/network/interfaces";

/// WPA credential configuration written by [`install_wifi`].
pub const WPA_CONF_PATH: &str = "/etc/wpa.conf";

/// Configures a generic USB WiFi device for DHCP.
///
/// This overwrites /etc/network/interfaces, so any changes you have made
/// will be lost; eth0 is reset to DHCP.
pub async fn install_wifi(ctx: &TaskContext, ssid: &str, psk: &str) -> Result<()> {
    ctx.reporter.task("Installing USB WiFi device");

    // Render everything before touching the host so a bad parameter set
    // fails with no remote side effects.
    let wpa_conf = template::render("wpa.conf", context! { ssid => ssid, psk => psk })?;
    let interfaces = template::render("interfaces", context! { wpa_conf_path => WPA_CONF_PATH })?;

    // The interface may already be down; a failure here is expected.
    ctx.target
        .run_privileged_tolerant(&Cmd::new("ifdown").args(["--force", "wlan0"]))
        .await?;

    fs::write_file(&ctx.target, INTERFACES_PATH, &interfaces, 0o644).await?;
    fs::write_file(&ctx.target, WPA_CONF_PATH, &wpa_conf, 0o644).await?;

    ctx.target
        .run_privileged(&Cmd::new("ifup").arg("wlan0"))
        .await?;
    Ok(())
}
