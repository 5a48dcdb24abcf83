//! SD card scanning: ROM files per platform and the saves next to them.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use romdeck_cache::RomHashCache;
use romdeck_core::{LocalRomFile, LocalSave, time};
use romdeck_lib::{Config, hasher, systems, util};

use crate::error::SyncError;

/// Plain files in `dir`, skipping dotfiles and subdirectories. A missing
/// directory is empty.
fn list_files(dir: &Path) -> Result<Vec<(PathBuf, String, fs::Metadata)>, SyncError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if util::is_hidden(&name) {
            continue;
        }
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        files.push((entry.path(), name, meta));
    }
    files.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(files)
}

/// ROM files for one platform directory.
///
/// Files already known to the hash cache are not hashed; the hash only
/// matters for looking them up on the server.
pub async fn scan_rom_dir(
    slug: &str,
    dir: &Path,
    hashes: &RomHashCache,
) -> Result<Vec<LocalRomFile>, SyncError> {
    let mut roms = Vec::new();
    for (path, file_name, meta) in list_files(dir)? {
        let sha1 = if hashes.lookup(slug, &file_name).is_some() {
            None
        } else {
            let hash_path = path.clone();
            match tokio::task::spawn_blocking(move || hasher::sha1_file(&hash_path)).await {
                Ok(Ok(hash)) => Some(hash.sha1),
                Ok(Err(e)) => {
                    log::warn!("Could not hash {}: {e}", path.display());
                    None
                }
                Err(e) => {
                    log::warn!("Hash task for {} failed: {e}", path.display());
                    None
                }
            }
        };
        roms.push(LocalRomFile {
            slug: slug.to_string(),
            path,
            file_name,
            sha1,
            last_modified: time::from_system_time(meta.modified()?),
            save: None,
            rom_id: 0,
            rom_name: None,
            remote_saves: Vec::new(),
        });
    }
    Ok(roms)
}

/// ROM files for every configured platform that has a directory on the card.
pub async fn scan_local_roms(
    config: &Config,
    hashes: &RomHashCache,
) -> Result<Vec<LocalRomFile>, SyncError> {
    let mut roms = Vec::new();
    for slug in config.configured_slugs() {
        let Some(dir) = config.rom_dir_for(&slug) else {
            log::debug!("No ROM directory for {slug}");
            continue;
        };
        if !dir.is_dir() {
            continue;
        }
        let found = scan_rom_dir(&slug, &dir, hashes).await?;
        log::debug!("{slug}: {} ROM file(s) in {}", found.len(), dir.display());
        roms.extend(found);
    }
    Ok(roms)
}

fn scan_save_dir(slug: &str, dir: &Path) -> Result<Vec<LocalSave>, SyncError> {
    list_files(dir)?
        .into_iter()
        .map(|(path, _, meta)| -> Result<LocalSave, SyncError> {
            Ok(LocalSave {
                slug: slug.to_string(),
                path,
                last_modified: time::from_system_time(meta.modified()?),
            })
        })
        .collect()
}

/// Saves for `slug` across all of its emulator folders, keyed by base name.
/// When two folders hold a save for the same game the newer one wins.
pub async fn scan_local_saves(config: &Config, slug: &str) -> HashMap<String, LocalSave> {
    let base = config.save_base();
    let tasks = systems::emulator_folders_for_slug(config.cfw, slug)
        .iter()
        .map(|folder| {
            let dir = base.join(folder);
            let slug = slug.to_string();
            tokio::task::spawn_blocking(move || {
                scan_save_dir(&slug, &dir).unwrap_or_else(|e| {
                    log::warn!("Could not scan {}: {e}", dir.display());
                    Vec::new()
                })
            })
        });

    let mut by_base: HashMap<String, LocalSave> = HashMap::new();
    for result in futures::future::join_all(tasks).await {
        let saves = match result {
            Ok(saves) => saves,
            Err(e) => {
                log::warn!("Save scan task failed: {e}");
                continue;
            }
        };
        for save in saves {
            let key = save.base_name().to_string();
            match by_base.get(&key) {
                Some(existing) if existing.last_modified >= save.last_modified => {}
                _ => {
                    by_base.insert(key, save);
                }
            }
        }
    }
    by_base
}

#[cfg(test)]
#[path = "tests/scan_tests.rs"]
mod tests;
