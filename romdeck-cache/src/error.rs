use romdeck_client::ClientError;
use romdeck_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Client(#[from] ClientError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Cache error: {0}")]
    Cache(String),
}

impl CacheError {
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }
}
