use std::{env, fmt::Display, fs::read_to_string, path::PathBuf, str::FromStr};

use axum::http::HeaderValue;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Secret {0} is not set")]
    MissingSecret(&'static str),

    #[error("Invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub mongo_url: String,
    pub mongo_database: String,
    pub mongo_transactions: bool,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub manager: ManagerAccount,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Allowed browser origin; any origin when unset.
    pub cors_origin: Option<HeaderValue>,
    pub bcrypt_cost: u32,
}

/// Credentials of the manager created on first start.
#[derive(Debug, Clone)]
pub struct ManagerAccount {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load("RUST_PORT", "8080")?,
            mongo_url: read_secret("MONGODB_URI")?,
            mongo_database: try_load("MONGODB_DATABASE", "knitwear")?,
            mongo_transactions: try_load("MONGODB_TRANSACTIONS", "true")?,
            jwt_secret: read_secret("JWT_SECRET")?,
            token_ttl_hours: try_load("TOKEN_TTL_HOURS", "24")?,
            manager: ManagerAccount {
                email: read_secret("MANAGER_EMAIL")?,
                password: read_secret("MANAGER_PASSWORD")?,
                full_name: read_secret("MANAGER_NAME")?,
            },
            upload_dir: try_load("UPLOAD_DIR", "uploads")?,
            max_upload_bytes: try_load("MAX_UPLOAD_BYTES", "5242880")?,
            cors_origin: cors_origin()?,
            bcrypt_cost: try_load("BCRYPT_COST", "10")?,
        })
    }
}

#[cfg(test)]
impl Config {
    /// Settings for handler tests over an in-memory store.
    pub fn for_tests(upload_dir: PathBuf) -> Self {
        Self {
            port: 0,
            mongo_url: String::new(),
            mongo_database: "knitwear-test".to_string(),
            mongo_transactions: false,
            jwt_secret: "test-secret".to_string(),
            token_ttl_hours: 1,
            manager: ManagerAccount {
                email: "mia@example.com".to_string(),
                password: "manager-password".to_string(),
                full_name: "Mia Manager".to_string(),
            },
            upload_dir,
            max_upload_bytes: 64 * 1024,
            cors_origin: None,
            bcrypt_cost: 4,
        }
    }
}

fn cors_origin() -> Result<Option<HeaderValue>, ConfigError> {
    let Ok(origin) = var("CORS_ORIGIN") else {
        return Ok(None);
    };

    HeaderValue::from_str(origin.trim())
        .map(Some)
        .map_err(|e| ConfigError::Invalid {
            key: "CORS_ORIGIN",
            reason: e.to_string(),
        })
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key,
                reason: e.to_string(),
            }
        })
}

/// Environment first, then a Docker secret mounted at `/run/secrets/<name>`.
fn read_secret(secret_name: &'static str) -> Result<String, ConfigError> {
    if let Ok(value) = env::var(secret_name) {
        return non_empty(secret_name, value);
    }

    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map_err(|e| {
            warn!("Failed to read {secret_name} from file: {e}");
            ConfigError::MissingSecret(secret_name)
        })
        .and_then(|value| non_empty(secret_name, value))
}

fn non_empty(secret_name: &'static str, value: String) -> Result<String, ConfigError> {
    let value = value.trim().to_string();

    if value.is_empty() {
        return Err(ConfigError::MissingSecret(secret_name));
    }

    Ok(value)
}
