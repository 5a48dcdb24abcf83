use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use romdeck_client::RomLibrary;
use romdeck_core::{LocalSave, SyncAction, time};
use romdeck_lib::{Config, util};

use crate::error::SyncError;
use crate::plan::{SyncItem, SyncPlan};
use crate::save_path::resolve_save_path;

const BACKUP_DIR: &str = ".backup";

/// Outcome of one plan item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    pub rom_name: String,
    pub action: SyncAction,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub results: Vec<SyncResult>,
}

impl SyncReport {
    pub fn succeeded(&self, action: SyncAction) -> usize {
        self.results
            .iter()
            .filter(|r| r.success && r.action == action)
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &SyncResult> {
        self.results.iter().filter(|r| !r.success)
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }
}

/// Run every item in order. One failure doesn't stop the rest.
pub async fn execute_plan(remote: &dyn RomLibrary, config: &Config, plan: &SyncPlan) -> SyncReport {
    let mut report = SyncReport::default();
    for item in &plan.items {
        report.results.push(execute_item(remote, config, item).await);
    }
    report
}

pub async fn execute_item(remote: &dyn RomLibrary, config: &Config, item: &SyncItem) -> SyncResult {
    let outcome = match item.action {
        SyncAction::Upload => upload(remote, item).await,
        SyncAction::Download => download(remote, config, item).await,
        SyncAction::Skip => Ok(()),
    };
    if let Err(e) = &outcome {
        log::warn!("{} {} failed: {e}", item.action, item.rom_name);
    }
    SyncResult {
        rom_name: item.rom_name.clone(),
        action: item.action,
        success: outcome.is_ok(),
        error: outcome.err().map(|e| e.to_string()),
    }
}

/// `.srm` style extension of `path`, or empty.
fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

/// Server-side name for an upload: `<base> [YYYY-MM-DD HH-MM-SS-000]<ext>`.
pub fn upload_file_name(save: &LocalSave) -> String {
    format!(
        "{} [{}]{}",
        save.base_name(),
        time::upload_stamp(save.last_modified),
        dotted_extension(&save.path)
    )
}

pub fn backup_file_name(save: &LocalSave) -> String {
    format!(
        "{} [{}]{}",
        save.base_name(),
        time::backup_stamp(save.last_modified),
        dotted_extension(&save.path)
    )
}

fn set_mtime(path: &Path, t: DateTime<Utc>) -> Result<(), SyncError> {
    let file = fs::File::options().write(true).open(path)?;
    file.set_modified(time::to_system_time(t))?;
    Ok(())
}

async fn upload(remote: &dyn RomLibrary, item: &SyncItem) -> Result<(), SyncError> {
    let local = item
        .local
        .as_ref()
        .ok_or_else(|| SyncError::sync("no local save to upload"))?;

    // The emulator is whichever folder the save sits in
    let emulator = local
        .dir()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let staging = tempfile::Builder::new().prefix("romdeck-upload").tempdir()?;
    let staged = staging.path().join(upload_file_name(local));
    tokio::fs::copy(&local.path, &staged).await?;

    let uploaded = remote.upload_save(item.rom_id, &staged, &emulator).await?;
    set_mtime(&local.path, uploaded.updated_at)?;
    log::debug!("Uploaded {} as save {}", local.path.display(), uploaded.id);
    Ok(())
}

/// Copy the current save to `<save dir>/.backup/` before it is replaced.
fn backup(local: &LocalSave) -> Result<(), SyncError> {
    if !local.path.exists() {
        return Ok(());
    }
    let dir = local.dir().join(BACKUP_DIR);
    util::create_dir_all(&dir)?;
    let dest = dir.join(backup_file_name(local));
    fs::copy(&local.path, &dest)?;
    log::debug!("Backed up {} to {}", local.path.display(), dest.display());
    Ok(())
}

async fn download(remote: &dyn RomLibrary, config: &Config, item: &SyncItem) -> Result<(), SyncError> {
    let save = item
        .remote
        .as_ref()
        .ok_or_else(|| SyncError::sync("no remote save to download"))?;

    if let Some(local) = &item.local {
        backup(local)?;
    }

    let dir = resolve_save_path(config, &item.slug, item.rom_id)?;
    let dest = dir.join(format!("{}{}", item.game_base, save.extension_with_dot()));
    let bytes = remote.download_save(&save.download_path).await?;

    if let Some(local) = &item.local {
        if local.path != dest && local.path.exists() {
            fs::remove_file(&local.path)?;
        }
    }
    util::write_atomic(&dest, &bytes)?;
    set_mtime(&dest, save.updated_at)?;
    log::debug!("Downloaded save {} to {}", save.id, dest.display());
    Ok(())
}

#[cfg(test)]
#[path = "tests/execute_tests.rs"]
mod tests;
