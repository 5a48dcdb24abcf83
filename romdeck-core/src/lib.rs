//! Shared data model for the romdeck sync core.
//!
//! Everything here is plain data: server-owned records (platforms,
//! collections, ROMs, saves, firmware), the local-side records built by
//! scanning the SD card, and the cache keys that partition the metadata
//! cache. No I/O lives in this crate.

pub mod cache_key;
pub mod error;
pub mod host;
pub mod model;
pub mod time;

pub use cache_key::{CacheKey, CacheKind};
pub use error::CoreError;
pub use host::Host;
pub use model::{
    Collection, CollectionKind, Firmware, LocalRomFile, LocalSave, Platform, Rom, Save,
    SyncAction,
};
