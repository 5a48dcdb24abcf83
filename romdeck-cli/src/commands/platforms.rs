use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::error::CliError;
use crate::session::Session;

/// List the server's platforms with their local ROM folder.
pub(crate) async fn run_platforms(session: &Session) -> Result<(), CliError> {
    let platforms = session.platforms();
    if platforms.is_empty() {
        log::info!(
            "{}",
            "The server has no platforms.".if_supports_color(Stdout, |t| t.dimmed()),
        );
        return Ok(());
    }

    log::info!("{}", "Platforms:".if_supports_color(Stdout, |t| t.bold()));
    for p in platforms {
        let cached = if session.games.check_freshness(&p.cache_key()) {
            "cached".if_supports_color(Stdout, |t| t.green()).to_string()
        } else {
            "not cached".if_supports_color(Stdout, |t| t.dimmed()).to_string()
        };
        let dir = match session.config.rom_dir_for(&p.slug) {
            Some(d) => d.display().to_string(),
            None => "(no folder mapping)".to_string(),
        };
        log::info!(
            "  {:<24} {:<36} {} [{}]",
            p.slug.if_supports_color(Stdout, |t| t.bold()),
            p.name,
            dir.if_supports_color(Stdout, |t| t.cyan()),
            cached,
        );
    }
    log::info!("");
    log::info!("Total: {} platforms", platforms.len());
    Ok(())
}
