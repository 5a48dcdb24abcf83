//! Config file location.
//!
//! The CLI and any other front-end resolve the config path the same way so
//! they always read the same document.

use std::path::PathBuf;

/// Environment variable that overrides the config location.
pub const CONFIG_ENV: &str = "ROMDECK_CONFIG";

/// Resolve the config path using a priority chain:
///
/// 1. CLI override (if `Some`)
/// 2. `$ROMDECK_CONFIG`
/// 3. `config.json` in the working directory
pub fn resolve_config_path(cli_override: Option<PathBuf>) -> PathBuf {
    if let Some(p) = cli_override {
        return p;
    }
    if let Some(p) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(p);
    }
    PathBuf::from("config.json")
}
