//! Error types for the sink module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while delivering an artifact.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Output directory does not exist and creation is disabled.
    #[error("Output directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to create the output directory.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Destination already exists and overwrite is disabled.
    #[error("Destination already exists: {path}")]
    DestinationExists { path: PathBuf },

    /// The artifact filename cannot be used as a plain file name.
    #[error("Invalid artifact filename: {filename}")]
    InvalidFilename { filename: String },

    /// Failed to write the artifact.
    #[error("Failed to write {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
