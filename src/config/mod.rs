use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Duration;
use thiserror::Error;

use crate::auth::token::DEFAULT_TOKEN_TTL_SECS;
use crate::models::user::normalize_email;
use crate::uploads::DEFAULT_MAX_THUMBNAIL_BYTES;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::SecurityHeadersLayer;

const DEFAULT_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_DATABASE_URL: &str = "postgres://postgres@localhost:5431/airsoftdb";
pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid listen address '{0}'")]
    InvalidAddress(String),

    #[error("{key} must be a number, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },

    #[error("AUTH_JWT_SECRET must be set to a strong secret in production")]
    WeakSecret,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub address: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub uploads_dir: PathBuf,
    pub upload_max_bytes: usize,
    pub admin_emails: Vec<String>,
    pub seed_events: bool,
    pub cors_allowed_origins: String,
    pub is_production: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let address = parse_address(&get("APP_ADDRESS").unwrap_or_else(|| DEFAULT_ADDRESS.into()))?;
        let is_production = get("RUST_ENV")
            .map(|v| matches!(v.to_lowercase().as_str(), "production" | "prod"))
            .unwrap_or(false);

        let jwt_secret = get("AUTH_JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.into());
        if is_production && (jwt_secret == DEV_JWT_SECRET || jwt_secret.len() < 16) {
            return Err(ConfigError::WeakSecret);
        }

        let admin_emails = get("ADMIN_EMAILS")
            .map(|raw| {
                raw.split(',')
                    .map(normalize_email)
                    .filter(|e| !e.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            address,
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            db_max_connections: parse_number(&get, "DATABASE_MAX_CONNECTIONS", 5)?,
            jwt_secret,
            token_ttl: Duration::seconds(parse_number(
                &get,
                "AUTH_TOKEN_TTL_SECS",
                DEFAULT_TOKEN_TTL_SECS,
            )?),
            uploads_dir: get("UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            upload_max_bytes: parse_number(&get, "UPLOAD_MAX_BYTES", DEFAULT_MAX_THUMBNAIL_BYTES)?,
            admin_emails,
            seed_events: get("SEED_EVENTS")
                .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no" | "off"))
                .unwrap_or(true),
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|| cors::DEFAULT_ALLOWED_ORIGINS.into()),
            is_production,
        })
    }
}

fn parse_number<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
        None => Ok(default),
    }
}

/// Accepts `host:port` or a bare `:port`, which binds all interfaces.
fn parse_address(raw: &str) -> Result<SocketAddr, ConfigError> {
    let candidate = if raw.starts_with(':') {
        format!("0.0.0.0{raw}")
    } else {
        raw.to_string()
    };
    candidate
        .parse()
        .map_err(|_| ConfigError::InvalidAddress(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();

        assert_eq!(cfg.address, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(cfg.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(cfg.token_ttl, Duration::days(30));
        assert_eq!(cfg.upload_max_bytes, 5 * 1024 * 1024);
        assert_eq!(cfg.uploads_dir, PathBuf::from("uploads"));
        assert!(cfg.admin_emails.is_empty());
        assert!(cfg.seed_events);
        assert_eq!(cfg.cors_allowed_origins, cors::DEFAULT_ALLOWED_ORIGINS);
        assert!(!cfg.is_production);
    }

    #[test]
    fn bare_port_binds_all_interfaces() {
        let cfg = config(&[("APP_ADDRESS", ":9000")]).unwrap();
        assert_eq!(cfg.address, "0.0.0.0:9000".parse().unwrap());
        assert!(matches!(
            config(&[("APP_ADDRESS", "nowhere")]),
            Err(ConfigError::InvalidAddress(_))
        ));
    }

    #[test]
    fn admin_emails_are_normalized() {
        let cfg = config(&[("ADMIN_EMAILS", " Boss@Example.com, ,ops@example.com ")]).unwrap();
        assert_eq!(cfg.admin_emails, ["boss@example.com", "ops@example.com"]);
    }

    #[test]
    fn invalid_numbers_are_reported() {
        let err = config(&[("UPLOAD_MAX_BYTES", "lots")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumber {
                key: "UPLOAD_MAX_BYTES",
                ..
            }
        ));
    }

    #[test]
    fn production_refuses_the_development_secret() {
        assert!(matches!(
            config(&[("RUST_ENV", "production")]),
            Err(ConfigError::WeakSecret)
        ));
        let cfg = config(&[
            ("RUST_ENV", "production"),
            ("AUTH_JWT_SECRET", "a-much-longer-production-secret"),
        ])
        .unwrap();
        assert!(cfg.is_production);
    }

    #[test]
    fn cors_origins_come_from_config() {
        let cfg = config(&[("CORS_ALLOWED_ORIGINS", "https://airsoft.example")]).unwrap();
        assert_eq!(cfg.cors_allowed_origins, "https://airsoft.example");
    }

    #[test]
    fn seeding_can_be_disabled() {
        assert!(!config(&[("SEED_EVENTS", "false")]).unwrap().seed_events);
    }
}
