//! Error types for loading, configuring and rendering timemaps.

use std::path::PathBuf;

use thiserror::Error;

/// Rejected configuration, reported before any pipeline stage runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown time unit {0:?} (expected one of h, hours, d, days, w, weeks)")]
    UnknownUnit(String),
    #[error("outlier count must be at least 1")]
    NonPositiveOutliers,
    #[error("image dimensions must be non-zero, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("axis maximum must be a positive number, got {0}")]
    InvalidAxisMax(f64),
    #[error("no input files given")]
    NoInputs,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },

    #[error("failed to load font {path:?}: {reason}")]
    Font { path: PathBuf, reason: String },

    #[error("failed to encode {path:?}: {reason}")]
    Encode { path: PathBuf, reason: String },

    #[error("failed to serialize layout plan: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
