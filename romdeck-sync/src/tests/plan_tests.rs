use std::path::PathBuf;

use chrono::Duration;
use romdeck_core::LocalRomFile;

use super::*;
use crate::testing::{FakeServer, at, server_rom, server_save};

fn local_save(name: &str, secs: i64) -> LocalSave {
    LocalSave {
        slug: "gba".to_string(),
        path: PathBuf::from(format!("/saves/mGBA/{name}.srm")),
        last_modified: at(secs),
    }
}

fn local_rom(name: &str, rom_id: i64) -> LocalRomFile {
    LocalRomFile {
        slug: "gba".to_string(),
        path: PathBuf::from(format!("/roms/{name}.gba")),
        file_name: format!("{name}.gba"),
        sha1: None,
        last_modified: at(0),
        save: None,
        rom_id,
        rom_name: None,
        remote_saves: Vec::new(),
    }
}

#[test]
fn decision_table() {
    let local = local_save("a", 100);
    assert_eq!(sync_action(None, None), SyncAction::Skip);
    assert_eq!(sync_action(Some(&local), None), SyncAction::Upload);
    assert_eq!(
        sync_action(None, Some(&server_save(1, 1, 100))),
        SyncAction::Download
    );
    assert_eq!(
        sync_action(Some(&local), Some(&server_save(1, 1, 101))),
        SyncAction::Download
    );
    assert_eq!(
        sync_action(Some(&local), Some(&server_save(1, 1, 99))),
        SyncAction::Upload
    );
    assert_eq!(
        sync_action(Some(&local), Some(&server_save(1, 1, 100))),
        SyncAction::Skip
    );
}

#[test]
fn sub_second_drift_is_skip() {
    let mut local = local_save("a", 100);
    local.last_modified += Duration::nanoseconds(999_999_999);
    assert_eq!(
        sync_action(Some(&local), Some(&server_save(1, 1, 100))),
        SyncAction::Skip
    );
}

#[test]
fn nanosecond_local_time_against_whole_second_remote() {
    use chrono::{TimeZone, Utc};

    let noon = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let mut local = local_save("a", 0);
    local.last_modified = noon + Duration::nanoseconds(123_456_789);
    let mut remote = server_save(1, 1, 0);

    remote.updated_at = noon;
    assert_eq!(sync_action(Some(&local), Some(&remote)), SyncAction::Skip);

    remote.updated_at = noon + Duration::seconds(1);
    assert_eq!(sync_action(Some(&local), Some(&remote)), SyncAction::Download);

    // Reversed: the card is a second ahead of the server
    local.last_modified = noon + Duration::seconds(1) + Duration::nanoseconds(123_456_789);
    remote.updated_at = noon;
    assert_eq!(sync_action(Some(&local), Some(&remote)), SyncAction::Upload);
}

#[test]
fn unresolved_rom_save_is_unmatched() {
    let mut rom = local_rom("Homebrew", 0);
    rom.save = Some(local_save("Homebrew", 5));

    let plan = build_plan(vec![rom]);

    assert!(plan.items.is_empty());
    assert_eq!(plan.unmatched.len(), 1);
    assert_eq!(plan.unmatched[0].base_name(), "Homebrew");
}

#[test]
fn newest_remote_save_decides() {
    let mut rom = local_rom("Golden Sun", 9);
    rom.save = Some(local_save("Golden Sun", 50));
    rom.remote_saves = vec![server_save(1, 9, 10), server_save(2, 9, 80), server_save(3, 9, 40)];

    let plan = build_plan(vec![rom]);

    assert_eq!(plan.items.len(), 1);
    assert_eq!(plan.items[0].action, SyncAction::Download);
    assert_eq!(plan.items[0].remote.as_ref().unwrap().id, 2);
    assert_eq!(plan.items[0].game_base, "Golden Sun");
}

#[test]
fn duplicate_downloads_collapse() {
    let mut a = local_rom("Golden Sun", 9);
    a.remote_saves = vec![server_save(1, 9, 10)];
    let mut b = local_rom("Golden Sun (Rev 1)", 9);
    b.remote_saves = vec![server_save(1, 9, 10)];
    let nothing = local_rom("Advance Wars", 10);

    let plan = build_plan(vec![a, b, nothing]);

    assert_eq!(plan.items.len(), 1);
    assert_eq!(plan.count(SyncAction::Download), 1);
}

fn touch(path: &std::path::Path, contents: &[u8]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

#[tokio::test]
async fn plans_against_the_card_and_server() {
    let sd = tempfile::tempdir().unwrap();
    let config = Config {
        sd_root: sd.path().to_path_buf(),
        ..Default::default()
    };
    let rom_dir = config.rom_dir_for("gba").unwrap();
    let save_dir = config.save_base().join("mGBA");
    touch(&rom_dir.join("Golden Sun.gba"), b"abc");
    touch(&save_dir.join("Golden Sun.srm"), b"gs");
    touch(&rom_dir.join("Homebrew.gba"), b"homebrew");
    touch(&save_dir.join("Homebrew.srm"), b"hb");
    touch(&rom_dir.join("Zelda.gba"), b"zelda");

    let hashes = RomHashCache::new(sd.path().join("cache/roms"));
    hashes.store("gba", "Zelda.gba", 12, "The Minish Cap").unwrap();

    let mut server = FakeServer::default();
    server.roms_by_hash.insert(
        "a9993e364706816aba3e25717850c26c9cd0d89d".to_string(),
        server_rom(9, "Golden Sun", "a9993e364706816aba3e25717850c26c9cd0d89d"),
    );
    server.saves = vec![server_save(1, 9, 0), server_save(2, 12, 0)];

    let plan = plan_sync(&server, &config, &hashes).await.unwrap();

    // Zelda came from the hash cache; the other two were looked up
    assert_eq!(server.hash_lookups(), 2);
    assert_eq!(hashes.lookup("gba", "golden sun.gba").unwrap().rom_id, 9);

    assert_eq!(plan.unmatched.len(), 1);
    assert_eq!(plan.items.len(), 2);
    let golden = plan.items.iter().find(|i| i.rom_id == 9).unwrap();
    assert_eq!(golden.action, SyncAction::Upload);
    assert_eq!(golden.rom_name, "Golden Sun");
    let zelda = plan.items.iter().find(|i| i.rom_id == 12).unwrap();
    assert_eq!(zelda.action, SyncAction::Download);
    assert_eq!(zelda.rom_name, "The Minish Cap");
    assert!(zelda.local.is_none());
}
