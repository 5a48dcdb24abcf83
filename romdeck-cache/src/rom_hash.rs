//! Local ROM file name -> server ROM id, one JSON file per platform slug.
//!
//! Keys are lowercased file names. Only successful lookups are recorded, so
//! a later miss can never erase a known mapping.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use romdeck_lib::util;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RomHashEntry {
    pub rom_id: i64,
    pub rom_name: String,
    pub cached_at: DateTime<Utc>,
}

type SlugEntries = BTreeMap<String, RomHashEntry>;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SlugFile {
    #[serde(default)]
    entries: SlugEntries,
}

pub struct RomHashCache {
    dir: PathBuf,
    /// Slugs are loaded from disk on first touch
    slugs: RwLock<HashMap<String, SlugEntries>>,
}

fn file_key(file_name: &str) -> String {
    file_name.to_lowercase()
}

impl RomHashCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            slugs: RwLock::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slug_path(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("{slug}.json"))
    }

    fn read_slug_file(&self, slug: &str) -> SlugEntries {
        let path = self.slug_path(slug);
        let Ok(contents) = fs::read_to_string(&path) else {
            return SlugEntries::new();
        };
        match serde_json::from_str::<SlugFile>(&contents) {
            Ok(file) => file.entries,
            Err(e) => {
                log::debug!("Ignoring corrupt ROM hash cache {}: {e}", path.display());
                SlugEntries::new()
            }
        }
    }

    fn ensure_loaded(&self, slug: &str) {
        if self
            .slugs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(slug)
        {
            return;
        }
        let entries = self.read_slug_file(slug);
        self.slugs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(slug.to_string())
            .or_insert(entries);
    }

    pub fn lookup(&self, slug: &str, file_name: &str) -> Option<RomHashEntry> {
        self.ensure_loaded(slug);
        self.slugs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(slug)
            .and_then(|m| m.get(&file_key(file_name)))
            .cloned()
    }

    /// Record a resolved file and persist the slug's map. Unresolved ids
    /// (0) are ignored.
    pub fn store(
        &self,
        slug: &str,
        file_name: &str,
        rom_id: i64,
        rom_name: &str,
    ) -> Result<(), CacheError> {
        if rom_id == 0 {
            return Ok(());
        }
        self.ensure_loaded(slug);
        let snapshot = {
            let mut slugs = self.slugs.write().unwrap_or_else(PoisonError::into_inner);
            let entries = slugs.entry(slug.to_string()).or_default();
            entries.insert(
                file_key(file_name),
                RomHashEntry {
                    rom_id,
                    rom_name: rom_name.to_string(),
                    cached_at: Utc::now(),
                },
            );
            entries.clone()
        };

        let file = SlugFile { entries: snapshot };
        util::write_atomic(&self.slug_path(slug), &serde_json::to_vec_pretty(&file)?)?;
        Ok(())
    }

    /// Number of known files for `slug`.
    pub fn len(&self, slug: &str) -> usize {
        self.ensure_loaded(slug);
        self.slugs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(slug)
            .map_or(0, |m| m.len())
    }

    /// Drop every mapping, on disk and in memory. Returns bytes freed.
    pub fn clear(&self) -> Result<u64, CacheError> {
        let mut slugs = self.slugs.write().unwrap_or_else(PoisonError::into_inner);
        slugs.clear();
        if !self.dir.exists() {
            return Ok(0);
        }
        let size = util::dir_size(&self.dir);
        fs::remove_dir_all(&self.dir)?;
        Ok(size)
    }
}
