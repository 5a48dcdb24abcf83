use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::model::{Collection, CollectionKind};

/// Which kind of listing a metadata cache slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    Platform,
    Collection,
    SmartCollection,
    VirtualCollection,
}

/// Checked longest-prefix first so `smart_collection_` never parses as
/// `collection_`.
const KINDS: &[CacheKind] = &[
    CacheKind::SmartCollection,
    CacheKind::VirtualCollection,
    CacheKind::Collection,
    CacheKind::Platform,
];

impl CacheKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Platform => "platform",
            Self::Collection => "collection",
            Self::SmartCollection => "smart_collection",
            Self::VirtualCollection => "virtual_collection",
        }
    }

    pub fn is_collection(&self) -> bool {
        !matches!(self, Self::Platform)
    }
}

impl From<CollectionKind> for CacheKind {
    fn from(kind: CollectionKind) -> Self {
        match kind {
            CollectionKind::Regular => Self::Collection,
            CollectionKind::Smart => Self::SmartCollection,
            CollectionKind::Virtual => Self::VirtualCollection,
        }
    }
}

/// Identifier of one metadata cache slot: `"<kind>_<id>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    kind: CacheKind,
    id: String,
}

impl CacheKey {
    pub fn new(kind: CacheKind, id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if !is_valid_id(&id) {
            return Err(CoreError::invalid_cache_key(format!(
                "{}_{id}: id must match [A-Za-z0-9_-]+",
                kind.prefix()
            )));
        }
        Ok(Self { kind, id })
    }

    pub fn platform(platform_id: i64) -> Self {
        Self {
            kind: CacheKind::Platform,
            id: platform_id.to_string(),
        }
    }

    /// Key for a collection. Characters outside the key grammar in virtual
    /// ids are replaced with `-`.
    pub fn for_collection(collection: &Collection) -> Self {
        let kind = CacheKind::from(collection.kind);
        let id = match collection.kind {
            CollectionKind::Virtual => sanitize_id(&collection.virtual_id),
            _ => collection.id.to_string(),
        };
        Self { kind, id }
    }

    pub fn kind(&self) -> CacheKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Numeric id for platform, regular and smart collection keys.
    pub fn numeric_id(&self) -> Option<i64> {
        self.id.parse().ok()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind.prefix(), self.id)
    }
}

impl FromStr for CacheKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for &kind in KINDS {
            if let Some(id) = s
                .strip_prefix(kind.prefix())
                .and_then(|rest| rest.strip_prefix('_'))
            {
                return Self::new(kind, id);
            }
        }
        Err(CoreError::invalid_cache_key(s))
    }
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn sanitize_id(id: &str) -> String {
    let cleaned: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "-".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
#[path = "tests/cache_key_tests.rs"]
mod tests;
