//! Wire shapes for server responses that don't map one-to-one onto the
//! shared model.

use chrono::{DateTime, Utc};
use romdeck_core::{Collection, CollectionKind, Rom};
use serde::Deserialize;

use crate::query::RomPage;

/// `GET /api/roms/` envelope.
#[derive(Debug, Deserialize)]
pub struct PagedRoms {
    #[serde(default)]
    pub items: Vec<Rom>,
    #[serde(default)]
    pub total: u64,
}

impl From<PagedRoms> for RomPage {
    fn from(p: PagedRoms) -> Self {
        RomPage {
            items: p.items,
            total: p.total,
        }
    }
}

/// Regular and smart collections share this shape.
#[derive(Debug, Deserialize)]
pub struct CollectionResponse {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CollectionResponse {
    pub fn into_collection(self, kind: CollectionKind) -> Collection {
        Collection {
            id: self.id,
            virtual_id: String::new(),
            name: self.name,
            kind,
            updated_at: self.updated_at,
        }
    }
}

/// Virtual collections are keyed by a server-generated string.
#[derive(Debug, Deserialize)]
pub struct VirtualCollectionResponse {
    pub id: String,
    pub name: String,
}

impl From<VirtualCollectionResponse> for Collection {
    fn from(v: VirtualCollectionResponse) -> Self {
        Collection {
            id: 0,
            virtual_id: v.id,
            name: v.name,
            kind: CollectionKind::Virtual,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paged_roms_tolerates_extra_fields() {
        let json = r#"{
            "items": [{
                "id": 9,
                "platform_id": 2,
                "platform_slug": "gba",
                "name": "Golden Sun",
                "fs_name": "Golden Sun (USA).gba",
                "sha1_hash": "abc",
                "updated_at": "2024-03-01T10:00:00Z",
                "path_cover_small": "/assets/9/small.png",
                "regions": ["USA"]
            }],
            "total": 41,
            "limit": 1,
            "offset": 0
        }"#;
        let page: RomPage = serde_json::from_str::<PagedRoms>(json).unwrap().into();
        assert_eq!(page.total, 41);
        assert_eq!(page.items[0].sha1.as_deref(), Some("abc"));
        assert_eq!(page.items[0].cover_path(), Some("/assets/9/small.png"));
    }

    #[test]
    fn virtual_collection_has_no_timestamp() {
        let json = r#"{"id": "recently-played", "name": "Recent", "type": "recent"}"#;
        let c: Collection = serde_json::from_str::<VirtualCollectionResponse>(json)
            .unwrap()
            .into();
        assert!(c.is_virtual());
        assert_eq!(c.virtual_id, "recently-played");
        assert_eq!(c.updated_at, None);
    }

    #[test]
    fn smart_collection_keeps_updated_at() {
        let json = r#"{"id": 4, "name": "Unplayed", "updated_at": "2024-01-01T00:00:00Z"}"#;
        let c = serde_json::from_str::<CollectionResponse>(json)
            .unwrap()
            .into_collection(CollectionKind::Smart);
        assert!(c.is_smart());
        assert!(c.updated_at.is_some());
        assert_eq!(c.cache_key().to_string(), "smart_collection_4");
    }
}
