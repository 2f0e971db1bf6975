// src/error.rs
//! Error taxonomy.
//!
//! - `ConfigError`: bad or missing settings; raised before any network call.
//! - `FetchError`: one HTTP round-trip went wrong. Whether that is fatal depends
//!   on the caller (enumeration propagates it, the detail fetcher contains it).
//! - `PipelineError`: anything that aborts a pipeline stage.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("STEAM_API_KEY is not set (required for the app list endpoint)")]
    MissingApiKey,

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Upstream { status: u16, url: String },

    #[error("rate limited (HTTP 429) by {url}")]
    RateLimited { url: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimited { .. })
    }

    /// HTTP status behind the failure, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Upstream { status, .. } => Some(*status),
            FetchError::RateLimited { .. } => Some(429),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{}: row {row}: {msg}", path.display())]
    Csv { path: PathBuf, row: usize, msg: String },

    #[error("{table}: missing column {column:?}")]
    MissingColumn { table: String, column: String },

    #[error("{0}")]
    Data(String),

    #[error("{0}")]
    Usage(String),
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
