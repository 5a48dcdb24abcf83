//! In-memory save server for this crate's tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use romdeck_client::{ArtworkHead, ClientError, RomLibrary, RomPage, RomQuery, SaveFilter};
use romdeck_core::{Collection, Firmware, Platform, Rom, Save};

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

pub fn server_rom(id: i64, name: &str, sha1: &str) -> Rom {
    Rom {
        id,
        platform_id: 1,
        platform_slug: "gba".to_string(),
        name: name.to_string(),
        fs_name: format!("{name}.gba"),
        sha1: Some(sha1.to_string()),
        updated_at: at(0),
        path_cover_small: None,
        path_cover_large: None,
        url_cover: None,
    }
}

pub fn server_save(id: i64, rom_id: i64, updated_secs: i64) -> Save {
    Save {
        id,
        rom_id,
        file_name: format!("save{id}.srm"),
        download_path: format!("/api/saves/{id}/content"),
        file_extension: "srm".to_string(),
        emulator: Some("mGBA".to_string()),
        updated_at: at(updated_secs),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub rom_id: i64,
    pub file_name: String,
    pub emulator: String,
    pub contents: Vec<u8>,
}

#[derive(Default)]
pub struct FakeServer {
    pub roms_by_hash: HashMap<String, Rom>,
    pub saves: Vec<Save>,
    pub save_data: HashMap<String, Vec<u8>>,
    /// `updated_at` the server assigns to uploads
    pub upload_time: Option<DateTime<Utc>>,
    pub uploads: Mutex<Vec<Upload>>,
    pub hash_lookups: AtomicUsize,
}

impl FakeServer {
    pub fn hash_lookups(&self) -> usize {
        self.hash_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RomLibrary for FakeServer {
    async fn get_platforms(&self) -> Result<Vec<Platform>, ClientError> {
        Ok(Vec::new())
    }

    async fn get_roms(&self, _query: &RomQuery) -> Result<RomPage, ClientError> {
        Ok(RomPage::default())
    }

    async fn get_rom_by_hash(&self, sha1: &str) -> Result<Option<Rom>, ClientError> {
        self.hash_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.roms_by_hash.get(sha1).cloned())
    }

    async fn get_collections(&self) -> Result<Vec<Collection>, ClientError> {
        Ok(Vec::new())
    }

    async fn get_smart_collections(&self) -> Result<Vec<Collection>, ClientError> {
        Ok(Vec::new())
    }

    async fn get_virtual_collections(&self) -> Result<Vec<Collection>, ClientError> {
        Ok(Vec::new())
    }

    async fn get_firmware(&self, _platform_id: i64) -> Result<Vec<Firmware>, ClientError> {
        Ok(Vec::new())
    }

    async fn get_saves(&self, _filter: &SaveFilter) -> Result<Vec<Save>, ClientError> {
        Ok(self.saves.clone())
    }

    async fn download_save(&self, download_path: &str) -> Result<Vec<u8>, ClientError> {
        self.save_data
            .get(download_path)
            .cloned()
            .ok_or_else(|| ClientError::status(404, "Not Found"))
    }

    async fn upload_save(
        &self,
        rom_id: i64,
        path: &Path,
        emulator: &str,
    ) -> Result<Save, ClientError> {
        let contents = std::fs::read(path)?;
        let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
        self.uploads.lock().unwrap().push(Upload {
            rom_id,
            file_name: file_name.clone(),
            emulator: emulator.to_string(),
            contents,
        });
        let Some(updated_at) = self.upload_time else {
            return Err(ClientError::status(500, "Internal Server Error"));
        };
        Ok(Save {
            id: 100,
            rom_id,
            file_name,
            download_path: "/api/saves/100/content".to_string(),
            file_extension: "srm".to_string(),
            emulator: Some(emulator.to_string()),
            updated_at,
        })
    }

    async fn head_artwork(&self, _path: &str) -> Result<ArtworkHead, ClientError> {
        Ok(ArtworkHead {
            ok: false,
            last_modified: None,
        })
    }

    async fn get_artwork(&self, _path: &str) -> Result<Vec<u8>, ClientError> {
        Err(ClientError::status(404, "Not Found"))
    }
}
