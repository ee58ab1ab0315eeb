//! Types for the transcoder module.

use std::path::Path;
use std::sync::Arc;

use crate::formats::Category;

/// A request to convert source bytes into a target format.
///
/// The source bytes are shared read-only; a transcoder cannot mutate them.
#[derive(Debug, Clone)]
pub struct TranscodeRequest {
    /// Unique job ID, used for scratch file names and logs.
    pub job_id: String,
    /// Original file name of the source (used as an input format hint).
    pub source_name: String,
    /// Source content.
    pub source: Arc<[u8]>,
    /// Category the source was picked under.
    pub category: Category,
    /// Target format identifier (e.g. "mp3").
    pub target_format: String,
}

impl TranscodeRequest {
    /// Creates a request with a fresh job ID.
    pub fn new(
        source_name: impl Into<String>,
        source: Arc<[u8]>,
        category: Category,
        target_format: impl Into<String>,
    ) -> Self {
        Self {
            job_id: uuid::Uuid::new_v4().to_string(),
            source_name: source_name.into(),
            source,
            category,
            target_format: target_format.into(),
        }
    }

    /// Returns the lowercase extension of the source name, if any.
    pub fn source_extension(&self) -> Option<String> {
        Path::new(&self.source_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .map(|e| e.to_ascii_lowercase())
    }
}
