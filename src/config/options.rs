// src/config/options.rs
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::consts::*;
use crate::error::ConfigError;

/// Runtime settings for the Steam client.
/// Built once at startup and handed to `SteamClient::new`.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub api_url: String,
    pub store_url: String,
    pub timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("store_url", &self.store_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(Self {
            api_key,
            api_url: s!(API_URL),
            store_url: s!(STORE_URL),
            timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
        })
    }

    /// Point both endpoints at one base URL (local mirrors, test servers).
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.api_url = s!(base);
        self.store_url = s!(base);
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as `from_env`, with the variable source injected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::new(lookup(API_KEY_VAR).unwrap_or_default())?;

        if let Some(url) = lookup(API_URL_VAR) {
            cfg.api_url = validate_url(API_URL_VAR, url)?;
        }
        if let Some(url) = lookup(STORE_URL_VAR) {
            cfg.store_url = validate_url(STORE_URL_VAR, url)?;
        }
        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: TIMEOUT_VAR,
                value: raw.clone(),
            })?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue { key: TIMEOUT_VAR, value: raw });
            }
            cfg.timeout = Duration::from_secs(secs);
        }
        Ok(cfg)
    }
}

fn validate_url(key: &'static str, url: String) -> Result<String, ConfigError> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(s!(trimmed))
    } else {
        Err(ConfigError::InvalidValue { key, value: url })
    }
}

/// Capability filter + page size for the app list endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumerateOptions {
    pub max_results: u32,
    pub include_games: bool,
    pub include_dlc: bool,
    pub include_software: bool,
    pub include_videos: bool,
    pub include_hardware: bool,
}

impl Default for EnumerateOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            include_games: true,
            include_dlc: false,
            include_software: false,
            include_videos: false,
            include_hardware: false,
        }
    }
}

impl EnumerateOptions {
    /// Page size actually sent; the server never returns more than `SERVER_MAX_RESULTS`.
    pub fn page_size(&self) -> u32 {
        self.max_results.clamp(1, SERVER_MAX_RESULTS)
    }
}

/// Settings for the bulk catalog scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanOptions {
    /// Pause after every detail request, whatever it returned.
    pub polite_delay: Duration,
    pub target_ratings: Vec<String>,
    pub per_rating: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            polite_delay: Duration::from_millis(SCAN_PAUSE_MS),
            target_ratings: SCAN_TARGET_RATINGS.iter().map(|r| s!(*r)).collect(),
            per_rating: SCAN_PER_RATING,
        }
    }
}

/// Where every persisted table lives, relative to one data directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataPaths {
    root: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_env() -> Self {
        match std::env::var(DATA_DIR_VAR) {
            Ok(dir) if !dir.trim().is_empty() => Self::new(dir.trim()),
            _ => Self::default(),
        }
    }

    pub fn root(&self) -> &Path { &self.root }
    pub fn apps(&self) -> PathBuf { self.root.join(APPS_FILE) }
    pub fn descriptions(&self) -> PathBuf { self.root.join(DESCRIPTIONS_FILE) }
    pub fn train_esrb(&self) -> PathBuf { self.root.join(TRAIN_ESRB_FILE) }
    pub fn test_esrb(&self) -> PathBuf { self.root.join(TEST_ESRB_FILE) }
    pub fn game_details(&self) -> PathBuf { self.root.join(GAME_DETAILS_FILE) }
    pub fn cleaned_details(&self) -> PathBuf { self.root.join(CLEANED_DETAILS_FILE) }
    pub fn scan(&self) -> PathBuf { self.root.join(SCAN_FILE) }
    pub fn processed_dir(&self) -> PathBuf { self.root.join(PROCESSED_SUBDIR) }
}
