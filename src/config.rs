//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local runs.

use std::env;
use std::str::FromStr;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection string (e.g. `sqlite:bank_recon.db`)
    pub database_url: String,
    /// Frontend origin allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Largest accepted request body for statement uploads
    pub max_upload_bytes: usize,
    /// Largest finance group tried when splitting one bank payment
    pub max_finance_combo: usize,
}

impl Config {
    /// Default config for testing only, backed by an in-memory database.
    pub fn test_default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            frontend_url: "http://localhost:5000".to_string(),
            port: 5000,
            max_upload_bytes: 25 * 1024 * 1024,
            max_finance_combo: 10,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:bank_recon.db".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),
            port: parse_var("PORT", 5000)?,
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", 25 * 1024 * 1024)?,
            max_finance_combo: parse_var("MAX_FINANCE_COMBO", 10)?,
        })
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var: name, value }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("PORT", "8088");
        env::set_var("MAX_FINANCE_COMBO", "6");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.port, 8088);
        assert_eq!(config.max_finance_combo, 6);
        assert_eq!(config.max_upload_bytes, 25 * 1024 * 1024);

        env::set_var("PORT", "not-a-port");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));

        env::remove_var("PORT");
        env::remove_var("MAX_FINANCE_COMBO");
    }
}
