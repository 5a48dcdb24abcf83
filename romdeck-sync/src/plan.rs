use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

use romdeck_cache::RomHashCache;
use romdeck_client::{RomLibrary, SaveFilter};
use romdeck_core::{LocalRomFile, LocalSave, Save, SyncAction, time};
use romdeck_lib::Config;

use crate::error::SyncError;
use crate::scan;

/// What to do about one game's save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncItem {
    pub action: SyncAction,
    pub rom_id: i64,
    pub rom_name: String,
    pub slug: String,
    /// ROM file name without extension; downloaded saves are named after it
    pub game_base: String,
    pub local: Option<LocalSave>,
    /// Newest save on the server
    pub remote: Option<Save>,
}

impl SyncItem {
    fn dedup_key(&self) -> String {
        match &self.local {
            Some(save) => save.path.to_string_lossy().into_owned(),
            None => format!("download_{}", self.rom_id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub items: Vec<SyncItem>,
    /// Local saves whose ROM the server doesn't know
    pub unmatched: Vec<LocalSave>,
}

impl SyncPlan {
    pub fn count(&self, action: SyncAction) -> usize {
        self.items.iter().filter(|i| i.action == action).count()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.unmatched.is_empty()
    }
}

/// The decision table. Times are compared at whole-second precision since
/// the server drops sub-seconds.
pub fn sync_action(local: Option<&LocalSave>, remote: Option<&Save>) -> SyncAction {
    match (local, remote) {
        (None, None) => SyncAction::Skip,
        (Some(_), None) => SyncAction::Upload,
        (None, Some(_)) => SyncAction::Download,
        (Some(l), Some(r)) => match time::cmp_seconds(l.last_modified, r.updated_at) {
            Ordering::Less => SyncAction::Download,
            Ordering::Equal => SyncAction::Skip,
            Ordering::Greater => SyncAction::Upload,
        },
    }
}

/// Turn scanned and resolved ROMs into a plan.
///
/// Unresolved ROMs never produce items; their local saves are reported as
/// unmatched. Games with no save on either side are left out.
pub fn build_plan(roms: Vec<LocalRomFile>) -> SyncPlan {
    let mut plan = SyncPlan::default();
    let mut seen = HashSet::new();

    for rom in roms {
        if !rom.is_resolved() {
            if let Some(save) = rom.save {
                plan.unmatched.push(save);
            }
            continue;
        }
        let remote = rom.latest_remote_save().cloned();
        if rom.save.is_none() && remote.is_none() {
            continue;
        }
        let item = SyncItem {
            action: sync_action(rom.save.as_ref(), remote.as_ref()),
            rom_id: rom.rom_id,
            rom_name: rom.display_name().to_string(),
            slug: rom.slug.clone(),
            game_base: rom.base_name().to_string(),
            local: rom.save,
            remote,
        };
        if seen.insert(item.dedup_key()) {
            plan.items.push(item);
        }
    }
    plan
}

/// Match local ROMs to server ROMs: hash cache first, then a hash lookup on
/// the server, caching what it finds. Lookup failures leave the ROM
/// unresolved.
pub async fn resolve_identities(
    remote: &dyn RomLibrary,
    hashes: &RomHashCache,
    roms: &mut [LocalRomFile],
) {
    for rom in roms.iter_mut() {
        if let Some(hit) = hashes.lookup(&rom.slug, &rom.file_name) {
            rom.rom_id = hit.rom_id;
            rom.rom_name = Some(hit.rom_name);
            continue;
        }
        let Some(sha1) = rom.sha1.clone() else {
            continue;
        };
        match remote.get_rom_by_hash(&sha1).await {
            Ok(Some(found)) => {
                rom.rom_id = found.id;
                rom.rom_name = Some(found.name.clone());
                if let Err(e) = hashes.store(&rom.slug, &rom.file_name, found.id, &found.name) {
                    log::warn!("Could not cache ROM id for {}: {e}", rom.file_name);
                }
            }
            Ok(None) => log::debug!("{} is not on the server", rom.file_name),
            Err(e) => log::warn!("Hash lookup for {} failed: {e}", rom.file_name),
        }
    }
}

/// Scan the card, fetch the server's saves and build the plan.
pub async fn plan_sync(
    remote: &dyn RomLibrary,
    config: &Config,
    hashes: &RomHashCache,
) -> Result<SyncPlan, SyncError> {
    let mut roms = scan::scan_local_roms(config, hashes).await?;

    let slugs: BTreeSet<String> = roms.iter().map(|r| r.slug.clone()).collect();
    let mut saves_by_slug = HashMap::new();
    for slug in slugs {
        let saves = scan::scan_local_saves(config, &slug).await;
        saves_by_slug.insert(slug, saves);
    }
    for rom in roms.iter_mut() {
        let save = saves_by_slug
            .get(&rom.slug)
            .and_then(|saves| saves.get(rom.base_name()))
            .cloned();
        rom.save = save;
    }

    let mut by_rom: HashMap<i64, Vec<Save>> = HashMap::new();
    for save in remote.get_saves(&SaveFilter::all()).await? {
        by_rom.entry(save.rom_id).or_default().push(save);
    }

    resolve_identities(remote, hashes, &mut roms).await;
    for rom in roms.iter_mut().filter(|r| r.is_resolved()) {
        rom.remote_saves = by_rom.get(&rom.rom_id).cloned().unwrap_or_default();
    }

    let plan = build_plan(roms);
    log::info!(
        "Save sync plan: {} upload, {} download, {} up to date, {} unmatched",
        plan.count(SyncAction::Upload),
        plan.count(SyncAction::Download),
        plan.count(SyncAction::Skip),
        plan.unmatched.len()
    );
    Ok(plan)
}

#[cfg(test)]
#[path = "tests/plan_tests.rs"]
mod tests;
