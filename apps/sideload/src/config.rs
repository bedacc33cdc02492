//! # Application Configuration
//!
//! TOML configuration for the binary. Every field has a default so an
//! absent file or an empty one yields a fully working local setup.
//!
//! ```toml
//! fixtures = "fixtures.json"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//! cors_permissive = false
//!
//! [cache]
//! enabled = true
//! ttl_secs = 300
//! ```

use crate::error::AppError;
use serde::Deserialize;
use sideload_core::{CacheStore, primitives::DEFAULT_CACHE_TTL_SECS};
use std::path::{Path, PathBuf};
use std::time::Duration;

// =============================================================================
// CONFIG STRUCTURES
// =============================================================================

/// Top-level application config.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Path to the fixture file.
    #[serde(default = "default_fixtures")]
    pub fixtures: PathBuf,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allow all origins. Off by default; turning it on is logged loudly.
    #[serde(default)]
    pub cors_permissive: bool,
}

/// Request-scoped cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

fn default_fixtures() -> PathBuf {
    PathBuf::from("fixtures.json")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_ttl() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fixtures: default_fixtures(),
            server: ServerConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_permissive: false,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

// =============================================================================
// LOADING
// =============================================================================

impl AppConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AppError::Io(format!("cannot read config file: {e}")))?;
        toml::from_str(&contents).map_err(|e| AppError::Config(format!("invalid config: {e}")))
    }

    /// Load from a file when one is given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// The server bind address, `host:port`.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Build the engine cache store from the cache section.
    #[must_use]
    pub fn cache_store(&self) -> CacheStore {
        CacheStore::new(self.cache.enabled, Duration::from_secs(self.cache.ttl_secs))
    }
}

// =============================================================================
// TESTS
// =============================================================================
