//! On-device caches for romdeck and the background refresh that keeps
//! them current.
//!
//! - [`games`]: ROM listings per platform or collection, with freshness
//!   metadata
//! - [`artwork`]: resized cover images
//! - [`rom_hash`]: local file name to server ROM id
//! - [`refresh`]: the process-wide coordinator that validates and prefetches
//!   listings at startup

pub mod artwork;
pub mod error;
pub mod games;
pub mod refresh;
pub mod rom_hash;

#[cfg(test)]
pub(crate) mod testing;

pub use artwork::{ArtworkCache, ArtworkSummary};
pub use error::CacheError;
pub use games::{GamesCache, MetadataEntry};
pub use refresh::{RefreshCoordinator, RefreshOptions, RefreshState};
pub use rom_hash::{RomHashCache, RomHashEntry};
