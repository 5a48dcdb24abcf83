//! The device configuration document (`config.json`).
//!
//! Every field has a default so partial documents load. Durations are
//! stored as integer nanoseconds.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use romdeck_core::Host;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::systems::{self, Cfw};
use crate::util;

const MINUTE_NANOS: u64 = 60 * 1_000_000_000;

pub const DEFAULT_API_TIMEOUT_NANOS: u64 = 30 * MINUTE_NANOS;
pub const DEFAULT_DOWNLOAD_TIMEOUT_NANOS: u64 = 60 * MINUTE_NANOS;

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// How save files are kept in step with the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveSyncMode {
    #[default]
    Off,
    Manual,
    Automatic,
}

/// Where the ROMs for one platform live on the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryMapping {
    /// Relative to the firmware's ROM base, or absolute
    pub relative_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub hosts: Vec<Host>,
    /// Platform slug -> ROM directory
    pub directory_mappings: BTreeMap<String, DirectoryMapping>,
    pub save_sync_mode: SaveSyncMode,
    /// Platform slug -> emulator save folder
    pub save_directory_mappings: BTreeMap<String, String>,
    /// ROM id -> emulator save folder
    pub game_save_overrides: BTreeMap<i64, String>,
    pub download_art: bool,
    pub show_box_art: bool,
    pub show_collections: bool,
    pub show_smart_collections: bool,
    pub show_virtual_collections: bool,
    /// Nanoseconds
    pub api_timeout: u64,
    /// Nanoseconds
    pub download_timeout: u64,
    pub log_level: String,
    pub language: String,
    pub kid_mode: bool,
    pub platform_order: Vec<String>,
    pub cfw: Cfw,
    pub sd_root: PathBuf,
    pub screen_width: u32,
    pub screen_height: u32,
    pub cache_dir: PathBuf,
    pub refresh_workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hosts: Vec::new(),
            directory_mappings: BTreeMap::new(),
            save_sync_mode: SaveSyncMode::Off,
            save_directory_mappings: BTreeMap::new(),
            game_save_overrides: BTreeMap::new(),
            download_art: true,
            show_box_art: true,
            show_collections: true,
            show_smart_collections: false,
            show_virtual_collections: false,
            api_timeout: DEFAULT_API_TIMEOUT_NANOS,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT_NANOS,
            log_level: "info".to_string(),
            language: "en".to_string(),
            kid_mode: false,
            platform_order: Vec::new(),
            cfw: Cfw::default(),
            sd_root: PathBuf::from("/mnt/mmc"),
            screen_width: 640,
            screen_height: 480,
            cache_dir: PathBuf::from(".cache"),
            refresh_workers: 8,
        }
    }
}

impl Config {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Write atomically, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;
        util::write_atomic(path, contents.as_bytes())?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for host in &self.hosts {
            host.validate()
                .map_err(|e| ConfigError::invalid(e.to_string()))?;
        }
        if self.refresh_workers == 0 {
            return Err(ConfigError::invalid("refresh_workers must be at least 1"));
        }
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err(ConfigError::invalid("screen dimensions must be non-zero"));
        }
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid(format!(
                "unknown log_level '{}'",
                self.log_level
            )));
        }
        for (slug, folder) in &self.save_directory_mappings {
            if folder.trim().is_empty() {
                return Err(ConfigError::invalid(format!(
                    "empty save folder for '{slug}'"
                )));
            }
        }
        Ok(())
    }

    /// The host used for this session (the first configured one).
    pub fn primary_host(&self) -> Option<&Host> {
        self.hosts.first()
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_nanos(self.api_timeout)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_nanos(self.download_timeout)
    }

    /// ROM directory for `slug`: explicit mapping first, then the firmware
    /// default.
    pub fn rom_dir_for(&self, slug: &str) -> Option<PathBuf> {
        if let Some(mapping) = self.directory_mappings.get(slug) {
            let p = Path::new(&mapping.relative_path);
            return Some(if p.is_absolute() {
                p.to_path_buf()
            } else {
                self.cfw.rom_base(&self.sd_root).join(p)
            });
        }
        systems::default_rom_dir(self.cfw, &self.sd_root, slug)
    }

    /// Slugs whose ROMs should be scanned: the mapped ones, or every slug the
    /// layout tables know when nothing is mapped.
    pub fn configured_slugs(&self) -> Vec<String> {
        if self.directory_mappings.is_empty() {
            systems::known_slugs().map(str::to_string).collect()
        } else {
            self.directory_mappings.keys().cloned().collect()
        }
    }

    pub fn save_base(&self) -> PathBuf {
        self.cfw.save_base(&self.sd_root)
    }

    /// Artwork target box: half the screen in each dimension.
    pub fn artwork_size(&self) -> (u32, u32) {
        ((self.screen_width / 2).max(1), (self.screen_height / 2).max(1))
    }

    pub fn games_cache_dir(&self) -> PathBuf {
        self.cache_dir.join("games")
    }

    pub fn artwork_cache_dir(&self) -> PathBuf {
        self.cache_dir.join("artwork")
    }

    pub fn rom_hash_cache_dir(&self) -> PathBuf {
        self.cache_dir.join("roms")
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
