//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use blog_infra::{DatabaseConfig, HashingConfig, JwtConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    /// Apply pending migrations before serving.
    pub run_migrations: bool,
    /// Page size used by listings when the client does not ask for one.
    pub default_page_size: u64,
    pub jwt: JwtConfig,
    pub hashing: HashingConfig,
}

fn parsed<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

fn flag(key: &str) -> bool {
    env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| {
            let mut config = DatabaseConfig::new(url);
            if let Some(max) = parsed("DB_MAX_CONNECTIONS") {
                config.max_connections = max;
            }
            if let Some(min) = parsed("DB_MIN_CONNECTIONS") {
                config.min_connections = min;
            }
            config
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT").unwrap_or(8080),
            database,
            run_migrations: flag("RUN_MIGRATIONS"),
            default_page_size: parsed("DEFAULT_PAGE_SIZE").unwrap_or(10),
            jwt: JwtConfig::from_env(),
            hashing: HashingConfig::from_env(),
        }
    }
}
