//! Error types for the workflow session.

use thiserror::Error;

use super::state::SessionPhase;
use crate::formats::Category;
use crate::sink::SinkError;
use crate::transcoder::TranscoderError;

/// Errors a workflow operation can report.
///
/// Only [`WorkflowError::ConversionFailed`] and [`WorkflowError::Sink`] are
/// returned in the default permissive mode; the others are returned only
/// when the session runs with `strict = true`.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Format not offered for the current category.
    #[error("Format '{format}' is not offered for {category} files")]
    InvalidFormatSelection { format: String, category: Category },

    /// Convert requested without a source file and/or a target format.
    #[error("Cannot convert without {missing}")]
    MissingInput { missing: &'static str },

    /// The transcoder reported failure.
    #[error("Conversion to {format} failed: {source}")]
    ConversionFailed {
        format: String,
        #[source]
        source: TranscoderError,
    },

    /// Download requested while no artifact exists.
    #[error("No converted file to download (session is {phase})")]
    DownloadUnavailable { phase: SessionPhase },

    /// Operation is not valid in the current phase.
    #[error("Cannot {operation} while session is {phase}")]
    NotAllowed {
        operation: &'static str,
        phase: SessionPhase,
    },

    /// The download sink failed to persist the artifact.
    #[error("Download failed: {0}")]
    Sink(#[from] SinkError),
}

impl WorkflowError {
    /// Whether this error should be shown to the user in permissive mode.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, Self::ConversionFailed { .. } | Self::Sink(_))
    }

    /// Whether retrying the failed conversion might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConversionFailed { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
}
