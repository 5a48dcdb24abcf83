use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use romdeck_core::{Collection, Firmware, Platform, Rom, Save};

use crate::error::ClientError;
use crate::query::{RomPage, RomQuery, SaveFilter};

/// Page size used when walking a full listing.
pub const PAGE_SIZE: u32 = 1000;

/// Result of a `HEAD` on a cover image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtworkHead {
    /// True only for a 200 response
    pub ok: bool,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Everything the caches and save sync need from the server.
///
/// [`crate::RommClient`] is the HTTP implementation; tests substitute an
/// in-memory one.
#[async_trait]
pub trait RomLibrary: Send + Sync {
    async fn get_platforms(&self) -> Result<Vec<Platform>, ClientError>;

    async fn get_roms(&self, query: &RomQuery) -> Result<RomPage, ClientError>;

    /// `Ok(None)` when no ROM on the server has this hash.
    async fn get_rom_by_hash(&self, sha1: &str) -> Result<Option<Rom>, ClientError>;

    async fn get_collections(&self) -> Result<Vec<Collection>, ClientError>;

    async fn get_smart_collections(&self) -> Result<Vec<Collection>, ClientError>;

    async fn get_virtual_collections(&self) -> Result<Vec<Collection>, ClientError>;

    async fn get_firmware(&self, platform_id: i64) -> Result<Vec<Firmware>, ClientError>;

    async fn get_saves(&self, filter: &SaveFilter) -> Result<Vec<Save>, ClientError>;

    /// Raw bytes of a save, by its server download path.
    async fn download_save(&self, download_path: &str) -> Result<Vec<u8>, ClientError>;

    /// Upload the file at `path` as a save for `rom_id`.
    async fn upload_save(
        &self,
        rom_id: i64,
        path: &Path,
        emulator: &str,
    ) -> Result<Save, ClientError>;

    async fn head_artwork(&self, path: &str) -> Result<ArtworkHead, ClientError>;

    async fn get_artwork(&self, path: &str) -> Result<Vec<u8>, ClientError>;
}

/// Fetch every ROM matching `query`, one page at a time.
///
/// Pages are 1-based. Stops once the collected count reaches the server's
/// total or a page comes back empty.
pub async fn fetch_all_roms(
    remote: &dyn RomLibrary,
    query: &RomQuery,
) -> Result<Vec<Rom>, ClientError> {
    let mut roms = Vec::new();
    let mut page = 1;
    loop {
        let q = query.clone().page(page).limit(PAGE_SIZE);
        let result = remote.get_roms(&q).await?;
        if result.items.is_empty() {
            break;
        }
        roms.extend(result.items);
        if roms.len() as u64 >= result.total {
            break;
        }
        page += 1;
    }
    log::debug!("Fetched {} ROMs in {} page(s)", roms.len(), page);
    Ok(roms)
}

/// Parse an HTTP `Last-Modified` value (`Wed, 21 Oct 2015 07:28:00 GMT`).
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

#[cfg(test)]
#[path = "tests/library_tests.rs"]
mod tests;
