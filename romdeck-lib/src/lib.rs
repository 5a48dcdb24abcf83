//! Shared plumbing for romdeck: configuration, device layout tables,
//! content hashing, atomic file writes and the bounded worker pool used by
//! the background refresh.

pub mod config;
pub mod error;
pub mod hasher;
pub mod settings;
pub mod systems;
pub mod util;
pub mod worker_pool;

pub use config::{Config, DirectoryMapping, SaveSyncMode};
pub use error::ConfigError;
pub use systems::{Cfw, SystemEntry};
pub use worker_pool::WorkerPool;
