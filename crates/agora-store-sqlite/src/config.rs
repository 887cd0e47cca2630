//! Store configuration module.
//!
//! Supports configuration via environment variables:
//!
//! ```bash
//! # Database location; omit to use ~/.agora/store.db
//! AGORA_DATABASE_URL=sqlite:///var/lib/agora/store.db
//!
//! # Pool size (default 1)
//! AGORA_DATABASE_MAX_CONNECTIONS=4
//! ```

use std::env;

use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid AGORA_DATABASE_MAX_CONNECTIONS: {0}")]
    InvalidMaxConnections(String),
}

/// SQLite store settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Database URL; `None` means the default store under `~/.agora`.
    pub url: Option<String>,
    /// Connection pool size.
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 1,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("AGORA_DATABASE_URL").ok();
        let max_connections = match env::var("AGORA_DATABASE_MAX_CONNECTIONS") {
            Ok(v) => v
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidMaxConnections(v))?,
            Err(_) => 1,
        };

        Ok(Self {
            url,
            max_connections,
        })
    }
}
