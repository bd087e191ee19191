//! Configuration module
//!
//! Environment-driven configuration for the service: server, database, object
//! storage, chat platform, and upload-session policy. Required values missing
//! from the environment are a `Configuration` error and fatal at startup.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;
use crate::storage_types::{StorageBackend, StoreBackend};

// Defaults
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const SESSION_TTL_MINUTES: u64 = 30;
const CHAT_API_BASE: &str = "https://api.telegram.org";

#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    pub server_port: u16,
    // Metadata/session store configuration
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Object storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Chat platform configuration
    pub bot_token: String,
    pub bot_username: String,
    pub chat_api_base: String,
    pub webhook_secret: String,
    pub admin_chat_ids: Vec<i64>,
    // Upload-session policy
    pub session_ttl_minutes: u64,
}

fn required(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Config(format!("{} must be set", name)))
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| AppError::Config(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, AppError> {
        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let store_backend = match env::var("STORE_BACKEND") {
            Ok(raw) => StoreBackend::from_str(&raw).map_err(|e| AppError::Config(e.to_string()))?,
            Err(_) => StoreBackend::Postgres,
        };
        let database_url = env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(AppError::Config(
                "DATABASE_URL must be set when STORE_BACKEND=postgres".to_string(),
            ));
        }

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(raw) => {
                StorageBackend::from_str(&raw).map_err(|e| AppError::Config(e.to_string()))?
            }
            Err(_) => StorageBackend::Local,
        };
        let s3_bucket = env::var("S3_BUCKET").ok();
        let s3_region = env::var("S3_REGION").ok();
        let s3_endpoint = env::var("S3_ENDPOINT").ok();
        if storage_backend == StorageBackend::S3 && (s3_bucket.is_none() || s3_region.is_none()) {
            return Err(AppError::Config(
                "S3_BUCKET and S3_REGION must be set when STORAGE_BACKEND=s3".to_string(),
            ));
        }

        let admin_chat_ids = env::var("ADMIN_CHAT_IDS")
            .unwrap_or_default()
            .split(',')
            .filter_map(|s| {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else {
                    Some(s.parse::<i64>().map_err(|_| {
                        AppError::Config(format!("ADMIN_CHAT_IDS has an invalid entry: {}", s))
                    }))
                }
            })
            .collect::<Result<Vec<i64>, AppError>>()?;

        Ok(Config {
            environment,
            server_port: parse_var("PORT", 8080)?,
            store_backend,
            database_url,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", MAX_CONNECTIONS)?,
            db_timeout_seconds: parse_var("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS)?,
            storage_backend,
            s3_bucket,
            s3_region,
            s3_endpoint,
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            bot_token: required("BOT_TOKEN")?,
            bot_username: required("BOT_USERNAME")?,
            chat_api_base: env::var("CHAT_API_BASE").unwrap_or_else(|_| CHAT_API_BASE.to_string()),
            webhook_secret: required("WEBHOOK_SECRET")?,
            admin_chat_ids,
            session_ttl_minutes: parse_var("SESSION_TTL_MINUTES", SESSION_TTL_MINUTES)?,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Whether the given chat id is configured as an administrator.
    pub fn is_admin_chat(&self, chat_id: i64) -> bool {
        self.admin_chat_ids.contains(&chat_id)
    }

    /// Session time-to-live as a `Duration`. Sessions idle longer than this
    /// are treated as expired on next access.
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_minutes * 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a config directly; from_env is exercised in one serial test below
    /// because env vars are process-global.
    fn test_config() -> Config {
        Config {
            environment: "test".to_string(),
            server_port: 8080,
            store_backend: StoreBackend::Memory,
            database_url: None,
            db_max_connections: 5,
            db_timeout_seconds: 5,
            storage_backend: StorageBackend::Local,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: Some("/tmp/notes".to_string()),
            local_storage_base_url: Some("http://localhost:8080/files".to_string()),
            bot_token: "123:abc".to_string(),
            bot_username: "inkwell_bot".to_string(),
            chat_api_base: CHAT_API_BASE.to_string(),
            webhook_secret: "hook".to_string(),
            admin_chat_ids: vec![42],
            session_ttl_minutes: 30,
        }
    }

    #[test]
    fn test_admin_chat_lookup() {
        let config = test_config();
        assert!(config.is_admin_chat(42));
        assert!(!config.is_admin_chat(7));
    }

    #[test]
    fn test_session_ttl_conversion() {
        let config = test_config();
        assert_eq!(config.session_ttl(), Duration::from_secs(30 * 60));
    }
}
