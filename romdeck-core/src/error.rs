/// Errors raised while building core model values.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A cache key did not match `<kind>_<id>`
    #[error("Invalid cache key: {0}")]
    InvalidCacheKey(String),

    /// A host URL could not be used as an origin
    #[error("Invalid host URL: {0}")]
    InvalidHost(String),
}

impl CoreError {
    pub fn invalid_cache_key(msg: impl Into<String>) -> Self {
        Self::InvalidCacheKey(msg.into())
    }

    pub fn invalid_host(msg: impl Into<String>) -> Self {
        Self::InvalidHost(msg.into())
    }
}
