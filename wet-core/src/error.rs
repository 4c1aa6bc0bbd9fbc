//! Error types for WET

use std::path::PathBuf;

use thiserror::Error;

use crate::transaction::ValidationError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid entry: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid budget period: {0}")]
    InvalidPeriod(String),

    #[error("No budget item at index {index} (period has {len} items)")]
    NoSuchItem { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
