use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::registry;

const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";
const DEFAULT_API_PATH: &str = "/api/predict";
const DEFAULT_ASSETS_BASE: &str = "./img/";
const DEFAULT_BG_FILE: &str = "bg.jpg";
const APP_DIR: &str = "upsbet_terminal";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base: String,
    pub api_path: String,
    pub timeout: Option<Duration>,
    pub assets_base: PathBuf,
    pub bg_file: String,
    pub default_home: String,
    pub default_away: String,
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl AppConfig {
    /// Loads `.env.local` then `.env` (neither overrides the real environment)
    /// before reading variables.
    pub fn load() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_env()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).and_then(|val| non_empty(&val).map(str::to_string));

        let timeout = get("PREDICT_TIMEOUT_SECS")
            .and_then(|val| val.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let log_dir = get("UPSBET_LOG_DIR")
            .map(PathBuf::from)
            .or_else(|| state_dir(&lookup))
            .unwrap_or_else(|| PathBuf::from("logs"));

        Self {
            api_base: get("PREDICT_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            api_path: get("PREDICT_API_PATH").unwrap_or_else(|| DEFAULT_API_PATH.to_string()),
            timeout,
            assets_base: PathBuf::from(
                get("ASSETS_BASE").unwrap_or_else(|| DEFAULT_ASSETS_BASE.to_string()),
            ),
            bg_file: get("BG_FILE").unwrap_or_else(|| DEFAULT_BG_FILE.to_string()),
            default_home: get("DEFAULT_HOME").unwrap_or_else(|| registry::DEFAULT_HOME.to_string()),
            default_away: get("DEFAULT_AWAY").unwrap_or_else(|| registry::DEFAULT_AWAY.to_string()),
            log_dir,
        }
    }

    /// Base and path joined with exactly one slash between them.
    pub fn endpoint_url(&self) -> String {
        if self.api_path.starts_with("http://") || self.api_path.starts_with("https://") {
            return self.api_path.clone();
        }
        let base = self.api_base.trim_end_matches('/');
        let path = self.api_path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

fn state_dir(lookup: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(base) = lookup("XDG_STATE_HOME").filter(|v| !v.trim().is_empty()) {
        return Some(PathBuf::from(base).join(APP_DIR).join("logs"));
    }
    let home = lookup("HOME").filter(|v| !v.trim().is_empty())?;
    Some(
        PathBuf::from(home)
            .join(".local")
            .join("state")
            .join(APP_DIR)
            .join("logs"),
    )
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
