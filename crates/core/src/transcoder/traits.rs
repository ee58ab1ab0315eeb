//! Trait definitions for the transcoder module.

use async_trait::async_trait;

use super::error::TranscoderError;
use super::types::TranscodeRequest;
use crate::formats::{Category, FormatCatalog};

/// Converts media bytes from one format to another.
///
/// Implementations must leave the request's source bytes untouched and must
/// return the same output for identical requests, so a caller may safely
/// retry after a failure.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Returns the name of this transcoder implementation.
    fn name(&self) -> &str;

    /// Converts the request's source bytes into the target format.
    async fn transcode(&self, request: TranscodeRequest) -> Result<Vec<u8>, TranscoderError>;

    /// Validates that the transcoder is properly configured and ready.
    async fn validate(&self) -> Result<(), TranscoderError>;

    /// Whether this transcoder can produce `target_format` for `category`.
    fn supports(&self, category: Category, target_format: &str) -> bool {
        FormatCatalog::standard().contains(category, target_format)
    }
}
