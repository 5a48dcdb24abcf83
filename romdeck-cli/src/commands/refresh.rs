use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use super::spinner;
use crate::error::CliError;
use crate::session::Session;

/// Wait for the startup validation the session kicked off and report
/// what it found.
pub(crate) async fn run_refresh(session: &Session) -> Result<(), CliError> {
    let platforms = session.platforms();
    let coordinator = &session.coordinator;

    let pb = spinner(format!("Checking {} platform(s)...", platforms.len()));
    coordinator.wait_until_idle().await;
    pb.finish_and_clear();

    let mut stale = 0;
    for p in platforms {
        let (fresh, validated) = coordinator.is_cache_fresh(&p.cache_key());
        let (has_bios, bios_known) = coordinator.has_bios(p.id);
        let mark = match (fresh, validated) {
            (true, _) => "\u{2714}".if_supports_color(Stdout, |t| t.green()).to_string(),
            (false, true) => {
                stale += 1;
                "\u{2718}".if_supports_color(Stdout, |t| t.red()).to_string()
            }
            (false, false) => "?".if_supports_color(Stdout, |t| t.yellow()).to_string(),
        };
        let bios = match (has_bios, bios_known) {
            (true, _) => " (BIOS)",
            _ => "",
        };
        log::info!("  {} {}{}", mark, p.name, bios.if_supports_color(Stdout, |t| t.dimmed()));
    }

    let collections = coordinator.collections();
    for c in &collections {
        let (fresh, _) = coordinator.is_cache_fresh(&c.cache_key());
        let mark = if fresh {
            "\u{2714}".if_supports_color(Stdout, |t| t.green()).to_string()
        } else {
            stale += 1;
            "\u{2718}".if_supports_color(Stdout, |t| t.red()).to_string()
        };
        log::info!("  {} {} [collection]", mark, c.name);
    }

    log::info!("");
    if stale == 0 {
        log::info!(
            "{} {} platform(s), {} collection(s) up to date",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            platforms.len(),
            collections.len(),
        );
    } else {
        log::warn!("{stale} listing(s) could not be refreshed; cached copies are kept");
    }
    Ok(())
}
