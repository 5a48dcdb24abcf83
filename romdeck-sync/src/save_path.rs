use std::path::PathBuf;

use romdeck_lib::{Config, systems, util};

use crate::error::SyncError;

/// Directory a downloaded save for `rom_id` should land in.
///
/// Order: per-game override, per-platform mapping, then the first emulator
/// folder the firmware uses for `slug`. Overrides naming a folder the
/// firmware doesn't use for this platform are ignored with a warning. The
/// directory is created if needed.
pub fn resolve_save_path(config: &Config, slug: &str, rom_id: i64) -> Result<PathBuf, SyncError> {
    let allowed = systems::emulator_folders_for_slug(config.cfw, slug);
    let Some(default) = allowed.first() else {
        return Err(SyncError::NoSaveFolder(slug.to_string()));
    };

    let is_allowed = |folder: &str| allowed.iter().any(|a| *a == folder);
    let mut chosen: &str = default;

    if let Some(folder) = config.save_directory_mappings.get(slug) {
        if is_allowed(folder) {
            chosen = folder;
        } else {
            log::warn!("Ignoring save folder '{folder}' for {slug}: not one of {allowed:?}");
        }
    }
    if let Some(folder) = config.game_save_overrides.get(&rom_id) {
        if is_allowed(folder) {
            chosen = folder;
        } else {
            log::warn!("Ignoring save folder '{folder}' for ROM {rom_id}: not one of {allowed:?}");
        }
    }

    let dir = config.save_base().join(chosen);
    util::create_dir_all(&dir)?;
    Ok(dir)
}
