use clap::ValueEnum;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use romdeck_cache::{ArtworkCache, GamesCache, RomHashCache};
use romdeck_lib::Config;

use super::format_bytes;
use crate::error::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum CacheTarget {
    Games,
    Art,
    Roms,
    All,
}

/// List cached listings with when they were fetched.
pub(crate) fn run_cache_list(config: &Config) {
    let entries = GamesCache::new(config.games_cache_dir()).list();
    if entries.is_empty() {
        log::info!(
            "{}",
            "No cached listings.".if_supports_color(Stdout, |t| t.dimmed()),
        );
        log::info!("Run 'romdeck refresh' to populate the cache.");
        return;
    }

    log::info!(
        "{}",
        "Cached listings:".if_supports_color(Stdout, |t| t.bold()),
    );
    for (key, entry) in &entries {
        log::info!(
            "  {:<32} changed {}  cached {}",
            key.if_supports_color(Stdout, |t| t.cyan()),
            entry.last_updated_at.format("%Y-%m-%d %H:%M:%S"),
            entry.cached_at.format("%Y-%m-%d %H:%M:%S"),
        );
    }
    log::info!("");
    log::info!("Total: {} listings", entries.len());
}

/// Remove cached data.
pub(crate) fn run_cache_clear(config: &Config, target: CacheTarget) -> Result<(), CliError> {
    let mut freed = 0;
    if matches!(target, CacheTarget::Games | CacheTarget::All) {
        freed += GamesCache::new(config.games_cache_dir()).clear()?;
    }
    if matches!(target, CacheTarget::Art | CacheTarget::All) {
        freed += ArtworkCache::new(config.artwork_cache_dir(), config.artwork_size()).clear()?;
    }
    if matches!(target, CacheTarget::Roms | CacheTarget::All) {
        freed += RomHashCache::new(config.rom_hash_cache_dir()).clear()?;
    }
    log::info!(
        "{} Cache cleared ({} freed)",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        format_bytes(freed),
    );
    Ok(())
}
