use super::*;

#[test]
fn freshness_check_params() {
    let params = RomQuery::platform(42).latest_change().to_params();
    assert_eq!(
        params,
        vec![
            ("platform_id", "42".to_string()),
            ("limit", "1".to_string()),
            ("order_by", "updated_at".to_string()),
            ("order_dir", "desc".to_string()),
        ]
    );
}

fn collection(kind: CollectionKind, id: i64, virtual_id: &str) -> Collection {
    Collection {
        id,
        virtual_id: virtual_id.to_string(),
        name: "Test".to_string(),
        kind,
        updated_at: None,
    }
}

#[test]
fn query_for_each_collection_kind() {
    let cases = [
        (collection(CollectionKind::Regular, 4, ""), RomFilter::Collection(4)),
        (collection(CollectionKind::Smart, 5, ""), RomFilter::SmartCollection(5)),
        (
            collection(CollectionKind::Virtual, 0, "recent"),
            RomFilter::VirtualCollection("recent".to_string()),
        ),
    ];
    for (c, filter) in cases {
        assert_eq!(RomQuery::for_collection(&c).filter, Some(filter));
    }
}

#[test]
fn virtual_query_keeps_server_id_verbatim() {
    let c = collection(CollectionKind::Virtual, 0, "franchise Super Mario");
    let params = RomQuery::for_collection(&c).to_params();
    assert_eq!(
        params[0],
        ("virtual_collection_id", "franchise Super Mario".to_string())
    );
    // The cache key is sanitized, the query is not
    assert_eq!(
        c.cache_key().to_string(),
        "virtual_collection_franchise-Super-Mario"
    );
}

#[test]
fn paging_params_follow_filter() {
    let params = RomQuery::new(RomFilter::VirtualCollection("fav".to_string()))
        .page(2)
        .limit(1000)
        .to_params();
    assert_eq!(params[0], ("virtual_collection_id", "fav".to_string()));
    assert_eq!(params[1], ("page", "2".to_string()));
    assert_eq!(params[2], ("limit", "1000".to_string()));
}

#[test]
fn save_filter_params() {
    assert!(SaveFilter::all().to_params().is_empty());
    let f = SaveFilter {
        rom_id: Some(7),
        platform_id: None,
    };
    assert_eq!(f.to_params(), vec![("rom_id", "7".to_string())]);
}
