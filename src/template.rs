//! Configuration templates.
//!
//! Templates are embedded in the binary and rendered with minijinja before
//! anything touches the remote host. Undefined variables are a hard error,
//! so a malformed parameter set fails the task before the first remote call.

use minijinja::{Environment, UndefinedBehavior};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::error::{Error, Result};

static ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.add_template("interfaces", include_str!("../templates/interfaces.conf.j2"))
        .expect("Invalid interfaces template");
    env.add_template("wpa.conf", include_str!("../templates/wpa.conf.j2"))
        .expect("Invalid wpa.conf template");
    env.add_template("motd", include_str!("../templates/motd.j2"))
        .expect("Invalid motd template");
    env.add_template("mpd.conf", include_str!("../templates/mpd.conf.j2"))
        .expect("Invalid mpd.conf template");
    env
});

/// Render the named embedded template with the given parameters.
pub fn render<S: Serialize>(name: &str, params: S) -> Result<String> {
    let template = ENV
        .get_template(name)
        .map_err(|e| Error::template_render(name, e.to_string()))?;
    template
        .render(params)
        .map_err(|e| Error::template_render(name, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_render_wpa_conf() {
        let rendered = render("wpa.conf", context! { ssid => "home", psk => "secret123" }).unwrap();
        assert!(rendered.starts_with("network={\n"));
        assert!(rendered.contains("    ssid=\"home\"\n"));
        assert!(rendered.contains("    psk=\"secret123\"\n"));
        assert!(rendered.trim_end().ends_with('}'));
    }

    #[test]
    fn test_render_interfaces() {
        let rendered =
            render("interfaces", context! { wpa_conf_path => "/etc/wpa.conf" }).unwrap();
        assert!(rendered.contains("iface wlan0 inet dhcp"));
        assert!(rendered.contains("wpa-conf /etc/wpa.conf"));
    }

    #[test]
    fn test_missing_parameter_is_an_error() {
        let result = render("wpa.conf", context! { ssid => "home" });
        match result {
            Err(Error::TemplateRender { template, .. }) => assert_eq!(template, "wpa.conf"),
            other => panic!("expected TemplateRender error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_template() {
        assert!(matches!(
            render("nope", context! {}),
            Err(Error::TemplateRender { .. })
        ));
    }

    #[test]
    fn test_rendered_output_has_no_placeholders() {
        let rendered = render("mpd.conf", context! { port => 6600, zeroconf_name => "Raspberry Pi" })
            .unwrap();
        assert!(!rendered.contains("{{"));
        assert!(rendered.contains("port                    \"6600\""));
        assert!(rendered.contains("zeroconf_name           \"Raspberry Pi\""));
    }
}
