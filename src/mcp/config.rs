//! MCP server configuration (spec.md §6.4, §9).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::config::{
    DEFAULT_BATCH_SIZE, DEFAULT_CACHE_DURATION_DAYS, DEFAULT_LOCK_TIMEOUT_SECONDS,
    DEFAULT_MAX_SCAN_WORKERS, DEFAULT_OPERATION_TIMEOUT_SECONDS,
};

const SECONDS_PER_DAY: u64 = 86_400;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub root_path: PathBuf,
    pub cache_duration: Duration,
    pub max_scan_workers: usize,
    pub batch_size: usize,
    pub lock_timeout: Duration,
    pub operation_timeout: Duration,
}

impl Config {
    /// Reads configuration from the environment. `MUSIC_ROOT_PATH` is
    /// required; everything else falls back to its spec default.
    pub fn from_env() -> Result<Self, String> {
        let root_path = env::var("MUSIC_ROOT_PATH")
            .map_err(|_| "MUSIC_ROOT_PATH must be set to an absolute path".to_string())?;
        let root_path = PathBuf::from(root_path);
        if !root_path.is_absolute() {
            return Err(format!("MUSIC_ROOT_PATH must be absolute, got {}", root_path.display()));
        }

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string());

        let cache_duration_days = parse_env("CACHE_DURATION_DAYS", DEFAULT_CACHE_DURATION_DAYS);
        let max_scan_workers = parse_env("MAX_SCAN_WORKERS", DEFAULT_MAX_SCAN_WORKERS);
        let batch_size = parse_env("BATCH_SIZE", DEFAULT_BATCH_SIZE);
        let lock_timeout_seconds = parse_env("LOCK_TIMEOUT_SECONDS", DEFAULT_LOCK_TIMEOUT_SECONDS);
        let operation_timeout_seconds = parse_env("OPERATION_TIMEOUT_SECONDS", DEFAULT_OPERATION_TIMEOUT_SECONDS);

        Ok(Self {
            log_level,
            root_path,
            cache_duration: Duration::from_secs(cache_duration_days.max(0) as u64 * SECONDS_PER_DAY),
            max_scan_workers,
            batch_size,
            lock_timeout: Duration::from_secs(lock_timeout_seconds),
            operation_timeout: Duration::from_secs(operation_timeout_seconds),
        })
    }

    /// Validates the root path exists and is a directory, per exit code 3
    /// ("root path unusable").
    pub fn validate_root_path(&self) -> Result<(), String> {
        if !self.root_path.is_dir() {
            return Err(format!("MUSIC_ROOT_PATH is not a directory: {}", self.root_path.display()));
        }
        Ok(())
    }

    pub fn init_logging(&self) {
        let level = match self.log_level.to_uppercase().as_str() {
            "DEBUG" => "debug",
            "WARNING" | "WARN" => "warn",
            "ERROR" => "error",
            _ => "info",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear_env() {
        for key in [
            "MUSIC_ROOT_PATH",
            "LOG_LEVEL",
            "CACHE_DURATION_DAYS",
            "MAX_SCAN_WORKERS",
            "BATCH_SIZE",
            "LOCK_TIMEOUT_SECONDS",
            "OPERATION_TIMEOUT_SECONDS",
        ] {
            unsafe { env::remove_var(key) };
        }
    }

    #[test]
    fn missing_root_path_is_an_error() {
        clear_env();
        assert!(Config::from_env().is_err());
    }

    #[test]
    fn defaults_match_spec() {
        clear_env();
        unsafe { env::set_var("MUSIC_ROOT_PATH", "/tmp/music") };
        let config = Config::from_env().unwrap();
        assert_eq!(config.log_level, "INFO");
        assert_eq!(config.cache_duration, Duration::from_secs(30 * SECONDS_PER_DAY));
        assert_eq!(config.lock_timeout, Duration::from_secs(5));
        assert_eq!(config.operation_timeout, Duration::from_secs(30));
        assert_eq!(config.max_scan_workers, 4);
        assert_eq!(config.batch_size, 100);
        clear_env();
    }

    #[test]
    fn relative_root_path_is_rejected() {
        clear_env();
        unsafe { env::set_var("MUSIC_ROOT_PATH", "music") };
        assert!(Config::from_env().is_err());
        clear_env();
    }
}
