use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A library server plus the credentials used to talk to it.
///
/// Immutable for the lifetime of a session; clone it into whatever needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    /// Base URL, e.g. `http://192.168.1.20:8080`
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Host {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Check that the URL looks like an HTTP origin.
    pub fn validate(&self) -> Result<(), CoreError> {
        let url = self.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CoreError::invalid_host(format!(
                "'{}' must start with http:// or https://",
                self.url
            )));
        }
        if url.len() <= "https://".len() {
            return Err(CoreError::invalid_host(format!("'{}' has no host part", self.url)));
        }
        Ok(())
    }

    /// Base URL without a trailing slash.
    pub fn origin(&self) -> &str {
        self.url.trim().trim_end_matches('/')
    }

    /// `Basic base64(user:pass)`, or `None` when no username is configured.
    pub fn authorization(&self) -> Option<String> {
        let user = self.username.as_deref().filter(|u| !u.is_empty())?;
        let pass = self.password.as_deref().unwrap_or("");
        let token = STANDARD.encode(format!("{user}:{pass}"));
        Some(format!("Basic {token}"))
    }

    /// Absolute URL for a server path, with spaces percent-encoded.
    ///
    /// Accepts paths with or without a leading slash. Paths that are already
    /// absolute URLs (cover art hosted elsewhere) are only space-encoded.
    pub fn url_for(&self, path: &str) -> String {
        let encoded = path.replace(' ', "%20");
        if encoded.starts_with("http://") || encoded.starts_with("https://") {
            return encoded;
        }
        if encoded.starts_with('/') {
            format!("{}{}", self.origin(), encoded)
        } else {
            format!("{}/{}", self.origin(), encoded)
        }
    }
}

#[cfg(test)]
#[path = "tests/host_tests.rs"]
mod tests;
