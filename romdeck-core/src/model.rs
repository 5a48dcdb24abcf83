use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache_key::CacheKey;

/// A platform as reported by the server. The slug is the stable key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

impl Platform {
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::platform(self.id)
    }
}

/// The three mutually exclusive collection flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Regular,
    Smart,
    Virtual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Numeric id for regular and smart collections; 0 for virtual ones
    pub id: i64,
    /// String id for virtual collections; empty otherwise
    pub virtual_id: String,
    pub name: String,
    pub kind: CollectionKind,
    /// Virtual collections have no modification time
    pub updated_at: Option<DateTime<Utc>>,
}

impl Collection {
    pub fn is_virtual(&self) -> bool {
        self.kind == CollectionKind::Virtual
    }

    pub fn is_smart(&self) -> bool {
        self.kind == CollectionKind::Smart
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::for_collection(self)
    }
}

/// A game on the server.
///
/// Field names follow the server's JSON so listings can be cached verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rom {
    pub id: i64,
    #[serde(default)]
    pub platform_id: i64,
    #[serde(default)]
    pub platform_slug: String,
    pub name: String,
    /// File name on the server's filesystem
    #[serde(default)]
    pub fs_name: String,
    #[serde(default, rename = "sha1_hash")]
    pub sha1: Option<String>,
    /// Server-authoritative; advances on any server-side change
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub path_cover_small: Option<String>,
    #[serde(default)]
    pub path_cover_large: Option<String>,
    #[serde(default)]
    pub url_cover: Option<String>,
}

impl Rom {
    /// Preferred cover path: small, then large, then the external URL.
    pub fn cover_path(&self) -> Option<&str> {
        [&self.path_cover_small, &self.path_cover_large, &self.url_cover]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .find(|p| !p.is_empty())
    }

    pub fn has_artwork(&self) -> bool {
        self.cover_path().is_some()
    }
}

/// A save file stored on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Save {
    pub id: i64,
    pub rom_id: i64,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub download_path: String,
    /// Extension without guaranteed leading dot (the server sends `srm`)
    #[serde(default)]
    pub file_extension: String,
    #[serde(default)]
    pub emulator: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Save {
    /// Extension with a leading dot, or empty.
    pub fn extension_with_dot(&self) -> String {
        let ext = self.file_extension.trim();
        if ext.is_empty() || ext.starts_with('.') {
            ext.to_string()
        } else {
            format!(".{ext}")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Firmware {
    pub id: i64,
    #[serde(default)]
    pub platform_id: i64,
    pub file_name: String,
    #[serde(default, rename = "file_size_bytes")]
    pub file_size: u64,
}

/// A save file found on the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSave {
    pub slug: String,
    pub path: PathBuf,
    pub last_modified: DateTime<Utc>,
}

impl LocalSave {
    /// File name without extension; the key that links a save to its ROM.
    pub fn base_name(&self) -> &str {
        file_base(&self.path)
    }

    /// Directory the save lives in (the emulator folder).
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// A ROM file found on the device, with whatever has been learned about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRomFile {
    pub slug: String,
    pub path: PathBuf,
    pub file_name: String,
    /// Lowercase hex SHA-1 of the contents, when it had to be computed
    pub sha1: Option<String>,
    pub last_modified: DateTime<Utc>,
    pub save: Option<LocalSave>,
    /// 0 until resolved against the server
    pub rom_id: i64,
    pub rom_name: Option<String>,
    pub remote_saves: Vec<Save>,
}

impl LocalRomFile {
    pub fn base_name(&self) -> &str {
        file_base(&self.path)
    }

    pub fn is_resolved(&self) -> bool {
        self.rom_id != 0
    }

    /// Name to show in reports: the server's name when known.
    pub fn display_name(&self) -> &str {
        self.rom_name.as_deref().unwrap_or(&self.file_name)
    }

    /// The remote save with the newest `updated_at`.
    pub fn latest_remote_save(&self) -> Option<&Save> {
        self.remote_saves.iter().max_by_key(|s| s.updated_at)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncAction {
    Upload,
    Download,
    Skip,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAction::Upload => write!(f, "upload"),
            SyncAction::Download => write!(f, "download"),
            SyncAction::Skip => write!(f, "skip"),
        }
    }
}

fn file_base(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("")
}

#[cfg(test)]
#[path = "tests/model_tests.rs"]
mod tests;
