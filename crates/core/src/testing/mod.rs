//! Testing utilities and mock implementations.
//!
//! These let hosts and integration tests drive the workflow without an
//! `ffmpeg` binary or a writable output directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use mediaconv_core::testing::{fixtures, MemorySink, MockTranscoder};
//!
//! let transcoder = Arc::new(MockTranscoder::new());
//! let ctl = WorkflowController::new(transcoder.clone());
//!
//! ctl.choose_category(Category::Audio).await;
//! ctl.select_format("mp3").await?;
//! ctl.select_file(fixtures::source_file("song.wav", 1_000)).await?;
//! ctl.convert().await?;
//!
//! let sink = MemorySink::new();
//! ctl.download_to(&sink).await?;
//! ```

mod memory_sink;
mod mock_transcoder;

pub use memory_sink::{DeliveredFile, MemorySink};
pub use mock_transcoder::{MockTranscoder, RecordedTranscode};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::formats::Category;
    use crate::session::SourceFile;

    /// Create a source file of `size` deterministic bytes.
    pub fn source_file(name: &str, size: usize) -> SourceFile {
        let content: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        SourceFile::new(name, content)
    }

    /// Create an audio source file with a category hint.
    pub fn audio_file(name: &str, size: usize) -> SourceFile {
        source_file(name, size).with_category_hint(Category::Audio)
    }

    /// Create a video source file with a category hint.
    pub fn video_file(name: &str, size: usize) -> SourceFile {
        source_file(name, size).with_category_hint(Category::Video)
    }
}
