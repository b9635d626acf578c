//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use summer_infra::DatabaseConfig;

const DEFAULT_PORT: u16 = 10000;
const DEFAULT_UPLOAD_DIR: &str = "static/uploads";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the server on in-memory repositories.
    pub database: Option<DatabaseConfig>,
    /// Apply pending migrations before serving.
    pub run_migrations: bool,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Absolute base URL used in photo links. Derived from each request
    /// when unset.
    pub public_base_url: Option<String>,
    /// Empty means any origin is allowed.
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database = non_empty("DATABASE_URL").map(|url| DatabaseConfig {
            url,
            max_connections: parse_var(&lookup, "DB_MAX_CONNECTIONS").unwrap_or(20),
            min_connections: parse_var(&lookup, "DB_MIN_CONNECTIONS").unwrap_or(2),
            connect_timeout: Duration::from_secs(
                parse_var(&lookup, "DB_CONNECT_TIMEOUT_SECS").unwrap_or(10),
            ),
        });

        Self {
            host: non_empty("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_var(&lookup, "PORT").unwrap_or(DEFAULT_PORT),
            database,
            run_migrations: lookup("RUN_MIGRATIONS")
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            upload_dir: non_empty("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            max_upload_bytes: parse_var(&lookup, "MAX_UPLOAD_BYTES")
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            public_base_url: non_empty("PUBLIC_BASE_URL")
                .map(|url| url.trim().trim_end_matches('/').to_string()),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// Parse a variable, treating unparsable values as unset.
fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}
