//! Server configuration.

use crate::error::{ServerError, ServerResult};
use std::net::SocketAddr;

/// Default request body limit (64 KiB).
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Prefix every route is mounted under, e.g. `/to-do`. Empty mounts at the root.
    pub base_path: String,
    /// Maximum accepted request body, in bytes.
    pub body_limit: usize,
}

impl ServerConfig {
    /// Creates a new server configuration.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            base_path: String::new(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Sets the bind address.
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Sets the base path.
    pub fn with_base_path(mut self, path: impl Into<String>) -> Self {
        self.base_path = path.into();
        self
    }

    /// Sets the request body limit.
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    /// Returns the normalized base path, or `None` when routes live at the root.
    ///
    /// Surrounding slashes are trimmed and a single leading slash added, so
    /// `to-do/`, `/to-do` and `/to-do/` are equivalent.
    pub fn mount_path(&self) -> ServerResult<Option<String>> {
        let trimmed = self.base_path.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Ok(None);
        }
        if let Some(c) = trimmed
            .chars()
            .find(|c| matches!(c, '{' | '}' | '*' | '?' | '#') || c.is_whitespace())
        {
            return Err(ServerError::InvalidConfig(format!(
                "base path {:?} contains {c:?}",
                self.base_path
            )));
        }
        Ok(Some(format!("/{trimmed}")))
    }

    /// Checks the configuration for values the server cannot run with.
    pub fn validate(&self) -> ServerResult<()> {
        if self.body_limit == 0 {
            return Err(ServerError::InvalidConfig(
                "body limit must be greater than zero".into(),
            ));
        }
        self.mount_path().map(|_| ())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], 8080)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.body_limit, DEFAULT_BODY_LIMIT);
        assert_eq!(config.mount_path().unwrap(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builder() {
        let config = ServerConfig::default()
            .with_bind_addr("0.0.0.0:9000".parse().unwrap())
            .with_base_path("/to-do")
            .with_body_limit(1024);

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.body_limit, 1024);
        assert_eq!(config.mount_path().unwrap().as_deref(), Some("/to-do"));
    }

    #[test]
    fn base_path_normalization() {
        for raw in ["to-do", "/to-do", "/to-do/", " to-do/ "] {
            let config = ServerConfig::default().with_base_path(raw);
            assert_eq!(config.mount_path().unwrap().as_deref(), Some("/to-do"));
        }
        for raw in ["", "/", "//"] {
            let config = ServerConfig::default().with_base_path(raw);
            assert_eq!(config.mount_path().unwrap(), None);
        }
        assert_eq!(
            ServerConfig::default()
                .with_base_path("/api/v1")
                .mount_path()
                .unwrap()
                .as_deref(),
            Some("/api/v1")
        );
    }

    #[test]
    fn rejects_bad_values() {
        assert!(ServerConfig::default()
            .with_base_path("/{id}")
            .validate()
            .is_err());
        assert!(ServerConfig::default()
            .with_base_path("/a b")
            .validate()
            .is_err());
        assert!(ServerConfig::default().with_body_limit(0).validate().is_err());
    }
}
