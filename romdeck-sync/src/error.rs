use romdeck_cache::CacheError;
use romdeck_client::ClientError;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Client(#[from] ClientError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("No save folder known for platform '{0}'")]
    NoSaveFolder(String),

    #[error("Sync error: {0}")]
    Sync(String),
}

impl SyncError {
    pub fn sync(msg: impl Into<String>) -> Self {
        Self::Sync(msg.into())
    }
}
