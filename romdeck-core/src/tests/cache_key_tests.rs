use super::*;

fn virtual_collection(virtual_id: &str) -> Collection {
    Collection {
        id: 0,
        virtual_id: virtual_id.to_string(),
        name: "Recently played".to_string(),
        kind: CollectionKind::Virtual,
        updated_at: None,
    }
}

#[test]
fn platform_key_formats_with_prefix() {
    assert_eq!(CacheKey::platform(42).to_string(), "platform_42");
}

#[test]
fn smart_collection_is_not_parsed_as_collection() {
    let key: CacheKey = "smart_collection_7".parse().unwrap();
    assert_eq!(key.kind(), CacheKind::SmartCollection);
    assert_eq!(key.id(), "7");
    assert_eq!(key.numeric_id(), Some(7));
}

#[test]
fn all_kinds_round_trip() {
    for s in [
        "platform_1",
        "collection_12",
        "smart_collection_3",
        "virtual_collection_recent-games_2",
    ] {
        let key: CacheKey = s.parse().unwrap();
        assert_eq!(key.to_string(), s);
    }
}

#[test]
fn rejects_bad_keys() {
    assert!("platform_".parse::<CacheKey>().is_err());
    assert!("platform".parse::<CacheKey>().is_err());
    assert!("console_4".parse::<CacheKey>().is_err());
    assert!("platform_4/../x".parse::<CacheKey>().is_err());
    assert!(CacheKey::new(CacheKind::Collection, "a b").is_err());
}

#[test]
fn virtual_ids_are_sanitized() {
    let key = CacheKey::for_collection(&virtual_collection("genre:Action RPG"));
    assert_eq!(key.to_string(), "virtual_collection_genre-Action-RPG");
    assert!(key.numeric_id().is_none());
}

#[test]
fn collection_kinds_map_to_cache_kinds() {
    let mut c = virtual_collection("x");
    c.id = 9;
    c.kind = CollectionKind::Smart;
    assert_eq!(CacheKey::for_collection(&c).to_string(), "smart_collection_9");
    c.kind = CollectionKind::Regular;
    assert_eq!(CacheKey::for_collection(&c).to_string(), "collection_9");
}
