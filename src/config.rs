//! Service configuration.
//!
//! Values come from an optional TOML file; command-line flags override them.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 5000
//! cors_origin = "*"
//!
//! [sessions]
//! capacity = 1024
//! idle_timeout_secs = 3600
//! sweep_interval_secs = 60
//!
//! [render]
//! pdf_min_scale = 0.5
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{HuffmanError, Result};
use crate::render::DEFAULT_MIN_SCALE;
use crate::session::SessionStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Value of `Access-Control-Allow-Origin`
    pub cors_origin: String,
    /// HTTP worker threads; `None` uses one per core
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            cors_origin: "*".to_string(),
            workers: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub capacity: usize,
    pub idle_timeout_secs: u64,
    /// How often expired sessions are swept; 0 disables the sweep
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: SessionStore::DEFAULT_CAPACITY,
            idle_timeout_secs: SessionStore::DEFAULT_MAX_IDLE.as_secs(),
            sweep_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Smallest PDF drawing scale before the tree is split over pages
    pub pdf_min_scale: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pdf_min_scale: DEFAULT_MIN_SCALE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub sessions: SessionConfig,
    pub render: RenderConfig,
}

impl ServiceConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| HuffmanError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path` when given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path)?;
                Self::from_toml(&text)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sessions.capacity == 0 {
            return Err(HuffmanError::Config(
                "sessions.capacity must be at least 1".to_string(),
            ));
        }
        if !(self.render.pdf_min_scale > 0.0 && self.render.pdf_min_scale <= 1.0) {
            return Err(HuffmanError::Config(format!(
                "render.pdf_min_scale must be in (0, 1], got {}",
                self.render.pdf_min_scale
            )));
        }
        Ok(())
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.sessions.idle_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        match self.sessions.sweep_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn session_store(&self) -> SessionStore {
        SessionStore::with_limits(self.sessions.capacity, self.idle_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.sessions.capacity, 1024);
        assert_eq!(config.sweep_interval(), Some(Duration::from_secs(60)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ServiceConfig::from_toml(
            r#"
            [server]
            port = 8080

            [sessions]
            capacity = 16
            sweep_interval_secs = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.sessions.capacity, 16);
        assert_eq!(config.sessions.idle_timeout_secs, 3600);
        assert_eq!(config.sweep_interval(), None);
        assert_eq!(config.session_store().capacity(), 16);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            ServiceConfig::from_toml("[sessions]\ncapacity = 0\n"),
            Err(HuffmanError::Config(_))
        ));
        assert!(matches!(
            ServiceConfig::from_toml("[render]\npdf_min_scale = 1.5\n"),
            Err(HuffmanError::Config(_))
        ));
        assert!(matches!(
            ServiceConfig::from_toml("[server]\nport = \"http\"\n"),
            Err(HuffmanError::Config(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("huffman.toml");
        fs::write(&path, "[render]\npdf_min_scale = 0.25\n").unwrap();

        let config = ServiceConfig::load(Some(&path)).unwrap();
        assert_eq!(config.render.pdf_min_scale, 0.25);
        assert!(ServiceConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
