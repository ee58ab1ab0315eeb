//! Mock transcoder for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, RwLock, Semaphore};

use crate::transcoder::{TranscodeRequest, Transcoder, TranscoderError};

/// A recorded transcode request for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedTranscode {
    /// The request that was submitted.
    pub request: TranscodeRequest,
    /// Whether the transcode succeeded.
    pub success: bool,
}

/// Mock implementation of the Transcoder trait.
///
/// Provides controllable behavior for testing:
/// - Track requests for assertions
/// - Simulate failure with an injected error or a panic
/// - Return fixed output instead of echoing the source
/// - Hold conversions in flight until released
///
/// # Example
///
/// ```rust,ignore
/// use mediaconv_core::testing::MockTranscoder;
///
/// let transcoder = Arc::new(MockTranscoder::new());
/// transcoder.hold().await;
///
/// let ctl = Arc::new(WorkflowController::new(transcoder.clone()));
/// let pending = tokio::spawn({ let ctl = ctl.clone(); async move { ctl.convert().await } });
///
/// transcoder.wait_for_start().await;
/// // ... session is Converting here ...
/// transcoder.release().await;
/// ```
#[derive(Debug)]
pub struct MockTranscoder {
    /// Recorded requests.
    requests: Arc<RwLock<Vec<RecordedTranscode>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<TranscoderError>>>,
    /// If set, the next transcode panics with this message once released.
    next_panic: Arc<RwLock<Option<String>>>,
    /// Bytes to return instead of the source.
    output: Arc<RwLock<Option<Vec<u8>>>>,
    /// Simulated transcode duration in milliseconds.
    duration_ms: Arc<RwLock<u64>>,
    /// Closed semaphore means "go"; absent means not holding.
    gate: Arc<RwLock<Option<Arc<Semaphore>>>>,
    /// Signalled each time a transcode starts.
    started: Arc<Notify>,
}

impl Default for MockTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranscoder {
    /// Create a new mock transcoder that echoes its input immediately.
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            next_panic: Arc::new(RwLock::new(None)),
            output: Arc::new(RwLock::new(None)),
            duration_ms: Arc::new(RwLock::new(0)),
            gate: Arc::new(RwLock::new(None)),
            started: Arc::new(Notify::new()),
        }
    }

    /// Get all recorded requests.
    pub async fn recorded_requests(&self) -> Vec<RecordedTranscode> {
        self.requests.read().await.clone()
    }

    /// Get the number of transcodes attempted.
    pub async fn call_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Clear recorded requests.
    pub async fn clear_recorded(&self) {
        self.requests.write().await.clear();
    }

    /// Configure the next transcode to fail with the given error.
    pub async fn set_next_error(&self, error: TranscoderError) {
        *self.next_error.write().await = Some(error);
    }

    /// Clear any pending error.
    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
    }

    /// Configure the next transcode to panic, as a buggy encoder binding would.
    pub async fn set_next_panic(&self, message: impl Into<String>) {
        *self.next_panic.write().await = Some(message.into());
    }

    /// Return these bytes from every successful transcode.
    pub async fn set_output(&self, bytes: impl Into<Vec<u8>>) {
        *self.output.write().await = Some(bytes.into());
    }

    /// Set the simulated transcode duration.
    pub async fn set_duration(&self, duration: Duration) {
        *self.duration_ms.write().await = duration.as_millis() as u64;
    }

    /// Keep transcodes started from now on in flight until [`release`](Self::release).
    pub async fn hold(&self) {
        *self.gate.write().await = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let held transcodes finish.
    pub async fn release(&self) {
        if let Some(gate) = self.gate.write().await.take() {
            gate.close();
        }
    }

    /// Wait until a transcode has started.
    pub async fn wait_for_start(&self) {
        self.started.notified().await;
    }

    /// Take the next error if set.
    async fn take_error(&self) -> Option<TranscoderError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transcode(&self, request: TranscodeRequest) -> Result<Vec<u8>, TranscoderError> {
        let error = self.take_error().await;
        let panic_message = self.next_panic.write().await.take();

        self.requests.write().await.push(RecordedTranscode {
            request: request.clone(),
            success: error.is_none() && panic_message.is_none(),
        });
        self.started.notify_one();

        let gate = self.gate.read().await.clone();
        if let Some(gate) = gate {
            // Err once the gate is closed by release().
            let _ = gate.acquire().await;
        }

        let duration_ms = *self.duration_ms.read().await;
        if duration_ms > 0 {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
        }

        if let Some(message) = panic_message {
            panic!("{}", message);
        }

        if let Some(err) = error {
            return Err(err);
        }

        match self.output.read().await.as_ref() {
            Some(bytes) => Ok(bytes.clone()),
            None => Ok(request.source.to_vec()),
        }
    }

    async fn validate(&self) -> Result<(), TranscoderError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok(())
    }
}
