use std::path::Path;
use std::sync::Arc;

use romdeck_cache::{
    ArtworkCache, GamesCache, RefreshCoordinator, RefreshOptions, RefreshState, RomHashCache,
};
use romdeck_client::{RomLibrary, RommClient};
use romdeck_core::Platform;
use romdeck_lib::Config;

use crate::error::CliError;

/// Everything a command that talks to the server needs: the loaded config,
/// a client for the primary host, the caches under the configured cache
/// directory and the running refresh coordinator.
pub(crate) struct Session {
    pub(crate) config: Config,
    pub(crate) client: Arc<RommClient>,
    pub(crate) games: Arc<GamesCache>,
    pub(crate) artwork: ArtworkCache,
    pub(crate) hashes: RomHashCache,
    pub(crate) coordinator: Arc<RefreshCoordinator>,
    /// Server platforms, in `platform_order` first, then by name
    platforms: Vec<Platform>,
}

impl Session {
    /// Connect, list the server's platforms and start validating the
    /// cached listings in the background.
    pub(crate) async fn open(config: Config, config_path: &Path) -> Result<Self, CliError> {
        let host = config
            .primary_host()
            .cloned()
            .ok_or_else(|| CliError::NoHost(config_path.display().to_string()))?;
        let client = Arc::new(RommClient::new(
            host,
            config.api_timeout(),
            config.download_timeout(),
        )?);
        let state = Arc::new(RefreshState::default());
        let games = Arc::new(GamesCache::with_refresh_state(config.games_cache_dir(), state));
        let artwork = ArtworkCache::new(config.artwork_cache_dir(), config.artwork_size());
        let hashes = RomHashCache::new(config.rom_hash_cache_dir());

        let mut platforms = client.get_platforms().await?;
        let order = &config.platform_order;
        platforms.sort_by_key(|p| {
            let rank = order.iter().position(|s| s == &p.slug).unwrap_or(usize::MAX);
            (rank, p.name.clone())
        });

        let remote: Arc<dyn RomLibrary> = client.clone();
        let coordinator = RefreshCoordinator::init(
            remote,
            Arc::clone(&games),
            RefreshOptions::from_config(&config),
            platforms.clone(),
        );
        if coordinator.start().is_some() {
            log::debug!("Background cache refresh started");
        }

        Ok(Self {
            config,
            client,
            games,
            artwork,
            hashes,
            coordinator,
            platforms,
        })
    }

    pub(crate) fn remote(&self) -> &dyn RomLibrary {
        self.client.as_ref()
    }

    pub(crate) fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub(crate) fn platform(&self, slug: &str) -> Result<&Platform, CliError> {
        self.platforms
            .iter()
            .find(|p| p.slug.eq_ignore_ascii_case(slug))
            .ok_or_else(|| CliError::unknown_platform(slug))
    }
}
