use std::sync::Mutex;

use chrono::TimeZone;
use romdeck_core::Rom;

use super::*;

/// Serves `total` ROMs in pages, recording every query it sees.
struct PagedLibrary {
    total: usize,
    queries: Mutex<Vec<RomQuery>>,
}

fn rom(id: i64) -> Rom {
    Rom {
        id,
        platform_id: 1,
        platform_slug: "gba".to_string(),
        name: format!("Game {id}"),
        fs_name: format!("game{id}.gba"),
        sha1: None,
        updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        path_cover_small: None,
        path_cover_large: None,
        url_cover: None,
    }
}

#[async_trait]
impl RomLibrary for PagedLibrary {
    async fn get_platforms(&self) -> Result<Vec<Platform>, ClientError> {
        Ok(Vec::new())
    }

    async fn get_roms(&self, query: &RomQuery) -> Result<RomPage, ClientError> {
        self.queries.lock().unwrap().push(query.clone());
        let page = query.page.unwrap_or(1) as usize;
        let limit = query.limit.unwrap_or(PAGE_SIZE) as usize;
        let start = (page - 1) * limit;
        let end = (start + limit).min(self.total);
        let items = (start..end).map(|i| rom(i as i64 + 1)).collect();
        Ok(RomPage {
            items,
            total: self.total as u64,
        })
    }

    async fn get_rom_by_hash(&self, _sha1: &str) -> Result<Option<Rom>, ClientError> {
        Ok(None)
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
        Ok(Vec::new())
    }

    async fn download_save(&self, _download_path: &str) -> Result<Vec<u8>, ClientError> {
        Err(ClientError::status(404, "Not Found"))
    }

    async fn upload_save(
        &self,
        _rom_id: i64,
        _path: &Path,
        _emulator: &str,
    ) -> Result<Save, ClientError> {
        Err(ClientError::status(500, "Internal Server Error"))
    }

    async fn head_artwork(&self, _path: &str) -> Result<ArtworkHead, ClientError> {
        Ok(ArtworkHead {
            ok: false,
            last_modified: None,
        })
    }

    async fn get_artwork(&self, _path: &str) -> Result<Vec<u8>, ClientError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn fetch_all_walks_pages_until_total() {
    let lib = PagedLibrary {
        total: 2500,
        queries: Mutex::new(Vec::new()),
    };
    let roms = fetch_all_roms(&lib, &RomQuery::platform(1)).await.unwrap();
    assert_eq!(roms.len(), 2500);
    assert_eq!(roms.last().unwrap().id, 2500);

    let queries = lib.queries.lock().unwrap();
    let pages: Vec<_> = queries.iter().map(|q| q.page).collect();
    assert_eq!(pages, vec![Some(1), Some(2), Some(3)]);
    assert!(queries.iter().all(|q| q.limit == Some(PAGE_SIZE)));
}

#[tokio::test]
async fn fetch_all_stops_on_empty_listing() {
    let lib = PagedLibrary {
        total: 0,
        queries: Mutex::new(Vec::new()),
    };
    let roms = fetch_all_roms(&lib, &RomQuery::platform(1)).await.unwrap();
    assert!(roms.is_empty());
    assert_eq!(lib.queries.lock().unwrap().len(), 1);
}

#[test]
fn http_date_parses_gmt() {
    let parsed = parse_http_date("Wed, 21 Oct 2015 07:28:00 GMT").unwrap();
    assert_eq!(parsed, Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap());
}

#[test]
fn malformed_http_date_is_none() {
    assert_eq!(parse_http_date("yesterday"), None);
    assert_eq!(parse_http_date(""), None);
}

#[test]
fn not_found_detection() {
    assert!(ClientError::status(404, "Not Found").is_not_found());
    assert!(!ClientError::status(500, "oops").is_not_found());
}
