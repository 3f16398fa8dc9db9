//! Error types for the hcinfo library

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for catalog and reporting operations
#[derive(Error, Debug)]
pub enum CatalogError {
    /// No accelerator matches the requested path
    #[error("no accelerator for path: '{0}'")]
    NotFound(String),

    /// A topology file exists but could not be read
    #[error("failed to read topology file {}: {source}", .path.display())]
    Topology {
        /// File that failed to read
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// A topology properties file contained a malformed line
    #[error("malformed line in {}: {line:?}", .path.display())]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// Offending line
        line: String,
    },

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing the report failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CatalogError {
    pub(crate) fn topology(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CatalogError::Topology {
            path: path.into(),
            source,
        }
    }

    /// True when the error means the requested accelerator does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }
}

/// Result type for hcinfo operations
pub type Result<T> = std::result::Result<T, CatalogError>;
