//! Transcoder module: the pluggable byte-level conversion contract.
//!
//! The workflow never converts bytes itself; it hands a [`TranscodeRequest`]
//! to a [`Transcoder`] and waits for the converted bytes.
//!
//! # Implementations
//!
//! - [`PassthroughTranscoder`]: a stub that returns the source bytes
//!   unchanged after a simulated delay. Not a real conversion.
//! - [`FfmpegTranscoder`]: writes the source to a scratch file, runs an
//!   external `ffmpeg` binary and reads the result back.
//!
//! # Example
//!
//! ```ignore
//! use mediaconv_core::transcoder::{create_transcoder, TranscodeRequest, TranscoderConfig};
//!
//! let transcoder = create_transcoder(&TranscoderConfig::default());
//! transcoder.validate().await?;
//!
//! let request = TranscodeRequest::new("song.wav", bytes, Category::Audio, "mp3");
//! let mp3 = transcoder.transcode(request).await?;
//! ```

mod config;
mod error;
mod ffmpeg;
mod passthrough;
mod traits;
mod types;

pub use config::{TranscoderBackend, TranscoderConfig};
pub use error::TranscoderError;
pub use ffmpeg::FfmpegTranscoder;
pub use passthrough::PassthroughTranscoder;
pub use traits::Transcoder;
pub use types::TranscodeRequest;

use std::time::Duration;

/// Factory function to create a transcoder from config.
pub fn create_transcoder(config: &TranscoderConfig) -> Box<dyn Transcoder> {
    match config.backend {
        TranscoderBackend::Passthrough => Box::new(PassthroughTranscoder::new(
            Duration::from_millis(config.simulated_delay_ms),
        )),
        TranscoderBackend::Ffmpeg => Box::new(FfmpegTranscoder::new(config.clone())),
    }
}
