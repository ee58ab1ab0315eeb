//! Error types for the transcoder module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while transcoding.
#[derive(Debug, Error)]
pub enum TranscoderError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// The target format has no encoder mapping.
    #[error("Unsupported target format: {format}")]
    UnsupportedTarget { format: String },

    /// The source content is empty.
    #[error("Source content is empty")]
    EmptyInput,

    /// Scratch directory does not exist and could not be created.
    #[error("Failed to create temp directory: {path}")]
    TempDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The encoder ran and reported failure.
    #[error("Conversion failed: {reason}")]
    ConversionFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// Conversion timed out.
    #[error("Conversion timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The encoder exited successfully but left no output behind.
    #[error("Output file not created: {path}")]
    OutputMissing { path: PathBuf },

    /// I/O error during conversion.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranscoderError {
    /// Creates a conversion failed error with optional stderr output.
    pub fn failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ConversionFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Creates an unsupported target error.
    pub fn unsupported_target(format: impl Into<String>) -> Self {
        Self::UnsupportedTarget {
            format: format.into(),
        }
    }

    /// Whether retrying the same request might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Io(_))
    }
}
