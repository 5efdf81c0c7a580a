//! API server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. A local `.env` file is honored in development (see main.rs).

use serde::{Deserialize, Serialize};
use std::env;

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// JWT token lifetime in seconds
    pub jwt_lifetime_secs: i64,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            http_port: env::var("MERIDIAN_HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("MERIDIAN_HTTP_PORT".to_string()))?,

            database_path: env::var("MERIDIAN_DB_PATH")
                .unwrap_or_else(|_| "./meridian.db".to_string()),

            jwt_secret: env::var("MERIDIAN_JWT_SECRET").unwrap_or_else(|_| {
                // Development fallback only
                // In production, this MUST be set via environment variable
                "meridian-dev-secret-change-in-production".to_string()
            }),

            jwt_lifetime_secs: env::var("MERIDIAN_JWT_LIFETIME_SECS")
                .unwrap_or_else(|_| "86400".to_string()) // 24 hours
                .parse()
                .map_err(|_| ConfigError::InvalidValue("MERIDIAN_JWT_LIFETIME_SECS".to_string()))?,
        };

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_load() {
        // No env vars set in the test environment for these keys
        let config = ApiConfig::load().unwrap();
        assert!(config.http_port > 0);
        assert!(!config.jwt_secret.is_empty());
        assert!(config.jwt_lifetime_secs > 0);
    }
}
