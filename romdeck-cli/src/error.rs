use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] romdeck_lib::ConfigError),

    #[error("{0}")]
    Client(#[from] romdeck_client::ClientError),

    #[error("{0}")]
    Cache(#[from] romdeck_cache::CacheError),

    #[error("{0}")]
    Sync(#[from] romdeck_sync::SyncError),

    /// No server configured
    #[error("No host configured; add one to {0}")]
    NoHost(String),

    /// The server has no platform with this slug
    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    /// Runtime creation or async error
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl CliError {
    pub(crate) fn unknown_platform(slug: impl Into<String>) -> Self {
        Self::UnknownPlatform(slug.into())
    }

    pub(crate) fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }
}
