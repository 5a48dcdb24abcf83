//! In-memory server used by this crate's tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use romdeck_client::{ArtworkHead, ClientError, RomFilter, RomLibrary, RomPage, RomQuery, SaveFilter};
use romdeck_core::{Collection, Firmware, Platform, Rom, Save};

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

pub fn rom(id: i64, platform_id: i64, updated_secs: i64) -> Rom {
    Rom {
        id,
        platform_id,
        platform_slug: "gba".to_string(),
        name: format!("Game {id}"),
        fs_name: format!("game{id}.gba"),
        sha1: None,
        updated_at: at(updated_secs),
        path_cover_small: Some(format!("/assets/{id}/cover small.png")),
        path_cover_large: None,
        url_cover: None,
    }
}

pub fn platform(id: i64, slug: &str) -> Platform {
    Platform {
        id,
        slug: slug.to_string(),
        name: slug.to_uppercase(),
    }
}

#[derive(Default)]
pub struct FakeLibrary {
    pub platforms: Vec<Platform>,
    /// Listing per filter
    pub roms: HashMap<String, Vec<Rom>>,
    pub collections: Vec<Collection>,
    pub smart_collections: Vec<Collection>,
    pub virtual_collections: Vec<Collection>,
    pub firmware: HashMap<i64, Vec<Firmware>>,
    pub artwork: HashMap<String, Vec<u8>>,
    pub last_modified: HashMap<String, DateTime<Utc>>,
    /// Delay applied to full (non-freshness-check) listings
    pub fetch_delay: Option<Duration>,
    pub fail_listings: bool,
    pub full_fetches: AtomicUsize,
    pub queries: Mutex<Vec<RomQuery>>,
    pub in_flight: AtomicUsize,
    /// Most listing requests seen at once
    pub peak_in_flight: AtomicUsize,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FakeLibrary {
    pub fn filter_key(filter: &Option<RomFilter>) -> String {
        match filter {
            Some(RomFilter::Platform(id)) => format!("platform_{id}"),
            Some(RomFilter::Collection(id)) => format!("collection_{id}"),
            Some(RomFilter::SmartCollection(id)) => format!("smart_collection_{id}"),
            Some(RomFilter::VirtualCollection(id)) => format!("virtual_collection_{id}"),
            None => String::new(),
        }
    }

    pub fn full_fetches(&self) -> usize {
        self.full_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RomLibrary for FakeLibrary {
    async fn get_platforms(&self) -> Result<Vec<Platform>, ClientError> {
        Ok(self.platforms.clone())
    }

    async fn get_roms(&self, query: &RomQuery) -> Result<RomPage, ClientError> {
        self.queries.lock().unwrap().push(query.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let _in_flight = InFlight(&self.in_flight);
        if self.fail_listings {
            return Err(ClientError::status(503, "Service Unavailable"));
        }
        let mut all = self
            .roms
            .get(&Self::filter_key(&query.filter))
            .cloned()
            .unwrap_or_default();
        let total = all.len() as u64;

        if query.limit == Some(1) {
            all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            all.truncate(1);
            return Ok(RomPage { items: all, total });
        }

        self.full_fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        let limit = query.limit.unwrap_or(u32::MAX) as usize;
        let page = query.page.unwrap_or(1) as usize;
        let items = all
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .collect();
        Ok(RomPage { items, total })
    }

    async fn get_rom_by_hash(&self, sha1: &str) -> Result<Option<Rom>, ClientError> {
        Ok(self
            .roms
            .values()
            .flatten()
            .find(|r| r.sha1.as_deref() == Some(sha1))
            .cloned())
    }

    async fn get_collections(&self) -> Result<Vec<Collection>, ClientError> {
        Ok(self.collections.clone())
    }

    async fn get_smart_collections(&self) -> Result<Vec<Collection>, ClientError> {
        Ok(self.smart_collections.clone())
    }

    async fn get_virtual_collections(&self) -> Result<Vec<Collection>, ClientError> {
        Ok(self.virtual_collections.clone())
    }

    async fn get_firmware(&self, platform_id: i64) -> Result<Vec<Firmware>, ClientError> {
        Ok(self.firmware.get(&platform_id).cloned().unwrap_or_default())
    }

    async fn get_saves(&self, _filter: &SaveFilter) -> Result<Vec<Save>, ClientError> {
        Ok(Vec::new())
    }

    async fn download_save(&self, _download_path: &str) -> Result<Vec<u8>, ClientError> {
        Err(ClientError::status(404, "Not Found"))
    }

    async fn upload_save(
        &self,
        _rom_id: i64,
        _path: &Path,
        _emulator: &str,
    ) -> Result<Save, ClientError> {
        Err(ClientError::status(501, "Not Implemented"))
    }

    async fn head_artwork(&self, path: &str) -> Result<ArtworkHead, ClientError> {
        if !self.artwork.contains_key(path) {
            return Ok(ArtworkHead {
                ok: false,
                last_modified: None,
            });
        }
        Ok(ArtworkHead {
            ok: true,
            last_modified: self.last_modified.get(path).copied(),
        })
    }

    async fn get_artwork(&self, path: &str) -> Result<Vec<u8>, ClientError> {
        self.artwork
            .get(path)
            .cloned()
            .ok_or_else(|| ClientError::status(404, "Not Found"))
    }
}
