//! Error types for the fallible outer layers (catalog loading, configuration).
//!
//! Normalization, index build and queries never fail; they have no error type.

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to open catalog '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV catalog error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON catalog error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported catalog format: '{0}' (expected .csv or .json)")]
    UnsupportedFormat(String),

    #[error("No catalog path configured. Pass a path or set MOVIEREC_CATALOG_PATH")]
    MissingCatalog,

    #[error("Configuration error: {0}")]
    Config(#[from] envy::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
