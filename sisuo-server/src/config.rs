//! Store and session configuration
//!
//! Configuration is loaded from environment variables:
//! - `DATABASE_URL`: PostgreSQL connection string (default: postgres://localhost/sisuo)
//! - `SISUO_DB_MAX_CONNECTIONS`: pool size (default: 5)
//! - `SISUO_DB_TIMEOUT_MS`: per-attempt store timeout (default: 5000)
//! - `SISUO_SESSION_TTL_SECS`: session lifetime (default: 86400)
//! - `SISUO_BCRYPT_COST`: password hashing cost (default: 12)
//!
//! Unparseable values fall back to the default with a warning.

use std::str::FromStr;
use std::time::Duration;

use crate::store::RetryPolicy;

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring unparseable environment value");
            default
        }),
        Err(_) => default,
    }
}

/// Document store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// Limit for one store call attempt
    pub op_timeout: Duration,
    /// Extra attempts after a transient failure
    pub retries: u32,
    pub retry_backoff: Duration,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections: env_or("SISUO_DB_MAX_CONNECTIONS", defaults.max_connections),
            op_timeout: Duration::from_millis(env_or(
                "SISUO_DB_TIMEOUT_MS",
                defaults.op_timeout.as_millis() as u64,
            )),
            ..defaults
        }
    }

    /// Override the database URL
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = url.into();
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            timeout: self.op_timeout,
            retries: self.retries,
            backoff: self.retry_backoff,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/sisuo".to_string(),
            max_connections: 5,
            op_timeout: Duration::from_secs(5),
            retries: 1,
            retry_backoff: Duration::from_millis(200),
        }
    }
}

/// Session and password configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long an issued token stays valid
    pub ttl: Duration,
    pub bcrypt_cost: u32,
}

impl SessionConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ttl: Duration::from_secs(env_or("SISUO_SESSION_TTL_SECS", defaults.ttl.as_secs())),
            bcrypt_cost: env_or("SISUO_BCRYPT_COST", defaults.bcrypt_cost),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}
