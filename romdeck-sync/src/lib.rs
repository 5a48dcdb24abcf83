//! Two-way save file sync between the device and the library server.
//!
//! [`plan::plan_sync`] scans the SD card, matches local ROMs to server ROMs
//! and decides per game whether to upload, download or leave the save
//! alone. [`execute::execute_plan`] carries the plan out.

pub mod error;
pub mod execute;
pub mod plan;
pub mod save_path;
pub mod scan;

#[cfg(test)]
pub(crate) mod testing;

pub use error::SyncError;
pub use execute::{SyncReport, SyncResult, execute_item, execute_plan};
pub use plan::{SyncItem, SyncPlan, build_plan, plan_sync, sync_action};
pub use save_path::resolve_save_path;
