use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Artificial response delay in milliseconds; zero disables it.
    pub latency_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the flat-file record database.
    pub db_path: String,
    pub feed_debounce_ms: u64,
    pub watch_interval_ms: u64,
}

impl ServerConfig {
    pub fn latency(&self) -> Option<Duration> {
        (self.latency_ms > 0).then(|| Duration::from_millis(self.latency_ms))
    }
}

impl StoreConfig {
    const fn default_feed_debounce_ms() -> u64 {
        50
    }

    const fn default_watch_interval_ms() -> u64 {
        200
    }

    pub fn feed_debounce(&self) -> Duration {
        Duration::from_millis(self.feed_debounce_ms)
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch_interval_ms)
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("COHORT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("COHORT_PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse::<u16>()?;

        let latency_ms = std::env::var("COHORT_LATENCY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);

        let db_path = std::env::var("COHORT_DB_PATH").unwrap_or_else(|_| "db.json".to_string());

        let feed_debounce_ms = std::env::var("COHORT_FEED_DEBOUNCE_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or_else(StoreConfig::default_feed_debounce_ms);

        let watch_interval_ms = std::env::var("COHORT_WATCH_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or_else(StoreConfig::default_watch_interval_ms);

        Ok(Config {
            server: ServerConfig {
                host,
                port,
                latency_ms,
            },
            store: StoreConfig {
                db_path,
                feed_debounce_ms,
                watch_interval_ms,
            },
        })
    }
}
