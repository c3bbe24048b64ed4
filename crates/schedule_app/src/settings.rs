//! Process-wide settings, read once at start-up.
//!
//! Per-run settings (teachers, notification channel) are not here; they are
//! re-read from the environment on every `/check`.

use std::path::PathBuf;
use std::time::Duration;

use engine_logging::{parse_level, LogDestination};
use log::LevelFilter;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SNAPSHOT_DIR: &str = "./snapshots";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub listen_addr: String,
    pub snapshot_dir: PathBuf,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
    pub notify_timeout: Duration,
}

impl ServerSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            listen_addr: get("listen_addr").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
            snapshot_dir: get("snapshot_dir")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_DIR)),
            log_level: get("log_level")
                .map(|raw| parse_level(&raw))
                .unwrap_or(LevelFilter::Info),
            log_file: get("log_file").map(PathBuf::from),
            notify_timeout: get("notify_timeout_secs")
                .and_then(|raw| raw.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(30)),
        }
    }

    pub fn log_destination(&self) -> LogDestination {
        match &self.log_file {
            Some(path) => LogDestination::Both(path.clone()),
            None => LogDestination::Terminal,
        }
    }
}
