use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use romdeck_lib::Config;

use crate::error::CliError;

fn mask_value(s: &str) -> String {
    if s.chars().count() <= 2 {
        "****".to_string()
    } else {
        format!("{}****", s.chars().take(2).collect::<String>())
    }
}

/// Print the effective configuration with passwords masked.
pub(crate) fn run_config_show(config: &Config, path: &Path) -> Result<(), CliError> {
    let state = if path.exists() {
        "(exists)".if_supports_color(Stdout, |t| t.green()).to_string()
    } else {
        "(not found, using defaults)"
            .if_supports_color(Stdout, |t| t.dimmed())
            .to_string()
    };
    log::info!(
        "  Config file: {} {}",
        path.display().if_supports_color(Stdout, |t| t.cyan()),
        state,
    );
    log::info!("");

    let mut shown = config.clone();
    for host in &mut shown.hosts {
        if let Some(pw) = host.password.as_mut() {
            *pw = mask_value(pw);
        }
    }
    let json = serde_json::to_string_pretty(&shown)
        .map_err(|e| CliError::runtime(format!("could not render config: {e}")))?;
    for line in json.lines() {
        log::info!("{line}");
    }
    Ok(())
}

pub(crate) fn run_config_path(path: &Path) {
    log::info!("{}", path.display());
}
