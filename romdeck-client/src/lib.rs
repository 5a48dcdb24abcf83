pub mod client;
pub mod error;
pub mod library;
pub mod query;
pub mod types;

pub use client::RommClient;
pub use error::ClientError;
pub use library::{ArtworkHead, PAGE_SIZE, RomLibrary, fetch_all_roms, parse_http_date};
pub use query::{OrderBy, OrderDir, RomFilter, RomPage, RomQuery, SaveFilter};
