use romdeck_core::{Collection, CollectionKind, Rom};

/// The single listing a ROM query is scoped to. One value per query, so
/// two ids can never be combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RomFilter {
    Platform(i64),
    Collection(i64),
    SmartCollection(i64),
    VirtualCollection(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    UpdatedAt,
    Name,
}

impl OrderBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderBy::UpdatedAt => "updated_at",
            OrderBy::Name => "name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDir {
    Asc,
    Desc,
}

impl OrderDir {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDir::Asc => "asc",
            OrderDir::Desc => "desc",
        }
    }
}

/// Parameters for `GET /api/roms/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RomQuery {
    pub filter: Option<RomFilter>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub order_by: Option<OrderBy>,
    pub order_dir: Option<OrderDir>,
}

impl RomQuery {
    pub fn new(filter: RomFilter) -> Self {
        Self {
            filter: Some(filter),
            ..Default::default()
        }
    }

    pub fn platform(platform_id: i64) -> Self {
        Self::new(RomFilter::Platform(platform_id))
    }

    /// The listing a collection's cache slot holds. Virtual collections
    /// are asked for by the server's id as-is; their cache key only carries
    /// a file-name-safe copy of it.
    pub fn for_collection(collection: &Collection) -> Self {
        let filter = match collection.kind {
            CollectionKind::Regular => RomFilter::Collection(collection.id),
            CollectionKind::Smart => RomFilter::SmartCollection(collection.id),
            CollectionKind::Virtual => RomFilter::VirtualCollection(collection.virtual_id.clone()),
        };
        Self::new(filter)
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn order(mut self, by: OrderBy, dir: OrderDir) -> Self {
        self.order_by = Some(by);
        self.order_dir = Some(dir);
        self
    }

    /// The one-item query used for freshness checks: newest change first.
    pub fn latest_change(self) -> Self {
        self.limit(1).order(OrderBy::UpdatedAt, OrderDir::Desc)
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        match &self.filter {
            Some(RomFilter::Platform(id)) => params.push(("platform_id", id.to_string())),
            Some(RomFilter::Collection(id)) => params.push(("collection_id", id.to_string())),
            Some(RomFilter::SmartCollection(id)) => {
                params.push(("smart_collection_id", id.to_string()))
            }
            Some(RomFilter::VirtualCollection(id)) => {
                params.push(("virtual_collection_id", id.clone()))
            }
            None => {}
        }
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(by) = self.order_by {
            params.push(("order_by", by.as_str().to_string()));
        }
        if let Some(dir) = self.order_dir {
            params.push(("order_dir", dir.as_str().to_string()));
        }
        params
    }
}

/// One page of ROMs plus the server's total for the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RomPage {
    pub items: Vec<Rom>,
    pub total: u64,
}

/// Optional filters for `GET /api/saves/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveFilter {
    pub rom_id: Option<i64>,
    pub platform_id: Option<i64>,
}

impl SaveFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(id) = self.rom_id {
            params.push(("rom_id", id.to_string()));
        }
        if let Some(id) = self.platform_id {
            params.push(("platform_id", id.to_string()));
        }
        params
    }
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
