use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub local_storage_dir: String,
    pub auth_dev_mode: bool,
    pub auth_secret: Option<String>,
    pub timer_tick_millis: u64,
    pub connection_timeout_seconds: u64,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_or("PORT", 8080),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://courtside.db?mode=rwc".to_string()),
            local_storage_dir: env::var("LOCAL_STORAGE_DIR")
                .unwrap_or_else(|_| "./.courtside".to_string()),
            auth_dev_mode: parse_or("AUTH_DEV_MODE", false),
            auth_secret: env::var("AUTH_SECRET").ok().filter(|secret| !secret.is_empty()),
            timer_tick_millis: parse_or("TIMER_TICK_MILLIS", 1000),
            connection_timeout_seconds: parse_or("CONNECTION_TIMEOUT_SECONDS", 300),
        }
    }

    pub fn timer_tick(&self) -> Duration {
        Duration::from_millis(self.timer_tick_millis.max(1))
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid {}={:?}, using the default", key, raw);
            default
        }),
        Err(_) => default,
    }
}
