pub(crate) mod art;
pub(crate) mod cache;
pub(crate) mod config;
pub(crate) mod platforms;
pub(crate) mod refresh;
pub(crate) mod roms;
pub(crate) mod saves;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use romdeck_core::{Platform, Rom};

use crate::error::CliError;
use crate::session::Session;

pub(crate) fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

pub(crate) fn spinner(msg: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("  {spinner:.cyan} {msg}") {
        pb.set_style(style.tick_chars("/-\\|"));
    }
    pb.set_message(msg.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub(crate) fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template("  [{bar:30.cyan/dim}] {pos}/{len} {msg}") {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}

/// A platform's ROM listing, as validated by the refresh coordinator.
pub(crate) async fn platform_roms(
    session: &Session,
    platform: &Platform,
) -> Result<Vec<Rom>, CliError> {
    let roms = session.coordinator.platform_games(platform).await?;
    log::debug!("{}: {} games", platform.cache_key(), roms.len());
    Ok(roms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_are_human_readable() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GB");
    }
}
