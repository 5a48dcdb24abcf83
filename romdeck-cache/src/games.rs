//! ROM listings cached per platform or collection.
//!
//! Layout under the cache directory:
//!
//! ```text
//! games/metadata.json        { "entries": { <key>: { last_updated_at, cached_at } } }
//! games/<key>.json           [Rom]
//! ```
//!
//! `last_updated_at` is the server-side change time the payload reflects,
//! which is what freshness checks compare against.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use romdeck_client::{RomLibrary, RomQuery};
use romdeck_core::{CacheKey, Rom, time};
use romdeck_lib::util;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;
use crate::refresh::RefreshState;

const METADATA_FILE: &str = "metadata.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub last_updated_at: DateTime<Utc>,
    pub cached_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Metadata {
    #[serde(default)]
    entries: BTreeMap<String, MetadataEntry>,
}

pub struct GamesCache {
    dir: PathBuf,
    state: Option<Arc<RefreshState>>,
    /// Serializes read-modify-write of metadata.json
    meta_lock: Mutex<()>,
}

impl GamesCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            state: None,
            meta_lock: Mutex::new(()),
        }
    }

    /// A cache whose writes and freshness reads go through `state`.
    pub fn with_refresh_state(dir: impl Into<PathBuf>, state: Arc<RefreshState>) -> Self {
        Self {
            state: Some(state),
            ..Self::new(dir)
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn refresh_state(&self) -> Option<&Arc<RefreshState>> {
        self.state.as_ref()
    }

    fn payload_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    /// Cached listing for `key`. Unreadable or corrupt payloads are a miss.
    pub fn load(&self, key: &CacheKey) -> Option<Vec<Rom>> {
        let path = self.payload_path(key);
        let contents = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(games) => Some(games),
            Err(e) => {
                log::debug!("Ignoring corrupt cache payload {}: {e}", path.display());
                None
            }
        }
    }

    pub fn has_payload(&self, key: &CacheKey) -> bool {
        self.payload_path(key).is_file()
    }

    /// Store a platform listing. Its freshness mark is the newest ROM change.
    pub fn save_platform(&self, key: &CacheKey, games: &[Rom]) -> Result<(), CacheError> {
        self.store(key, games, latest_update(games))
    }

    /// Store a collection listing, stamped with the collection's own change
    /// time. Virtual collections have none and fall back to the newest ROM.
    pub fn save_collection(
        &self,
        key: &CacheKey,
        games: &[Rom],
        updated_at: Option<DateTime<Utc>>,
    ) -> Result<(), CacheError> {
        let stamp = updated_at.unwrap_or_else(|| latest_update(games));
        self.store(key, games, stamp)
    }

    fn store(
        &self,
        key: &CacheKey,
        games: &[Rom],
        last_updated_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        let payload = serde_json::to_vec(games)?;
        util::write_atomic(&self.payload_path(key), &payload)?;

        {
            let _guard = self.meta_lock.lock().unwrap_or_else(PoisonError::into_inner);
            let mut meta = self.read_metadata();
            meta.entries.insert(
                key.to_string(),
                MetadataEntry {
                    last_updated_at,
                    cached_at: Utc::now(),
                },
            );
            util::write_atomic(&self.metadata_path(), &serde_json::to_vec_pretty(&meta)?)?;
        }

        if let Some(state) = &self.state {
            state.set_fresh(key, true);
        }
        log::debug!("Cached {} games for {key}", games.len());
        Ok(())
    }

    fn read_metadata(&self) -> Metadata {
        let Ok(contents) = fs::read_to_string(self.metadata_path()) else {
            return Metadata::default();
        };
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            log::debug!("Ignoring corrupt cache metadata: {e}");
            Metadata::default()
        })
    }

    pub fn entry(&self, key: &CacheKey) -> Option<MetadataEntry> {
        self.read_metadata().entries.get(&key.to_string()).copied()
    }

    /// Every metadata entry, ordered by key.
    pub fn list(&self) -> Vec<(String, MetadataEntry)> {
        self.read_metadata().entries.into_iter().collect()
    }

    /// Cheap foreground check. Prefers the coordinator's validated answer,
    /// then falls back to "a payload exists".
    pub fn check_freshness(&self, key: &CacheKey) -> bool {
        if let Some(fresh) = self.state.as_ref().and_then(|s| s.freshness(key)) {
            return fresh;
        }
        self.has_payload(key)
    }

    /// Ask the server whether the cached listing for `key` is still current.
    /// `listing` is the query the payload was fetched with.
    ///
    /// Only the newest ROM is fetched. An empty remote listing is fresh
    /// only when the cached one is empty too.
    pub async fn strict_check(
        &self,
        remote: &dyn RomLibrary,
        key: &CacheKey,
        listing: &RomQuery,
    ) -> Result<bool, CacheError> {
        let Some(entry) = self.entry(key) else {
            return Ok(false);
        };
        let Some(cached) = self.load(key) else {
            return Ok(false);
        };

        let query = listing.clone().latest_change();
        let page = remote.get_roms(&query).await?;
        let fresh = match page.items.first() {
            None => cached.is_empty(),
            Some(newest) => {
                time::cmp_seconds(newest.updated_at, entry.last_updated_at) != Ordering::Greater
            }
        };
        log::debug!("Strict check {key}: fresh={fresh}");
        Ok(fresh)
    }

    /// Remove everything. Returns bytes freed.
    pub fn clear(&self) -> Result<u64, CacheError> {
        let _guard = self.meta_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.dir.exists() {
            return Ok(0);
        }
        let size = util::dir_size(&self.dir);
        fs::remove_dir_all(&self.dir)?;
        if let Some(state) = &self.state {
            state.clear_freshness();
        }
        Ok(size)
    }
}

fn latest_update(games: &[Rom]) -> DateTime<Utc> {
    games
        .iter()
        .map(|g| g.updated_at)
        .max()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
#[path = "tests/games_tests.rs"]
mod tests;
