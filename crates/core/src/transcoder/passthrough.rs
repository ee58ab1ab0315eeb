//! Passthrough transcoder stub.
//!
//! This is NOT a format conversion: the returned "converted" bytes are the
//! source bytes, after an optional delay that simulates encoder latency. It
//! keeps the workflow usable when no real encoder is wired in. Wire an
//! [`FfmpegTranscoder`](super::FfmpegTranscoder) or another [`Transcoder`]
//! for real output.

use async_trait::async_trait;
use std::time::Duration;

use super::error::TranscoderError;
use super::traits::Transcoder;
use super::types::TranscodeRequest;

/// Stub transcoder that echoes its input.
#[derive(Debug, Clone, Default)]
pub struct PassthroughTranscoder {
    delay: Duration,
}

impl PassthroughTranscoder {
    /// Creates a stub that answers after `delay`.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Creates a stub that answers immediately.
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[async_trait]
impl Transcoder for PassthroughTranscoder {
    fn name(&self) -> &str {
        "passthrough"
    }

    async fn transcode(&self, request: TranscodeRequest) -> Result<Vec<u8>, TranscoderError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        tracing::debug!(
            job_id = %request.job_id,
            target = %request.target_format,
            bytes = request.source.len(),
            "Passthrough stub returning source bytes unchanged"
        );

        Ok(request.source.to_vec())
    }

    async fn validate(&self) -> Result<(), TranscoderError> {
        Ok(())
    }
}
