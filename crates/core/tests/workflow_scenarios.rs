//! Workflow controller integration tests.
//!
//! These tests drive the controller through its public API with a mock
//! transcoder:
//! - The end-to-end scenarios (convert, re-select, missing input, failure)
//! - Re-entrancy and late results while a conversion is in flight
//! - Event ordering and strict mode
//! - Delivery to the filesystem sink

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use mediaconv_core::{
    session::{ConvertOutcome, SkipReason},
    sink::{FsSink, SinkConfig},
    testing::{fixtures, MemorySink, MockTranscoder},
    transcoder::TranscoderError,
    Category, SessionConfig, SessionEvent, SessionPhase, WorkflowController, WorkflowError,
};

/// Test helper wiring a controller to a mock transcoder.
struct TestHarness {
    ctl: Arc<WorkflowController>,
    transcoder: Arc<MockTranscoder>,
}

impl TestHarness {
    fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    fn strict() -> Self {
        Self::with_config(SessionConfig::strict())
    }

    fn with_config(config: SessionConfig) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let transcoder = Arc::new(MockTranscoder::new());
        let ctl = Arc::new(WorkflowController::with_config(
            Arc::clone(&transcoder) as Arc<dyn mediaconv_core::Transcoder>,
            config,
        ));
        Self { ctl, transcoder }
    }

    /// Category, format and file selected; ready to convert.
    async fn ready(&self, category: Category, format: &str, file_name: &str, size: usize) {
        self.ctl.choose_category(category).await;
        assert!(self.ctl.select_format(format).await.unwrap());
        assert!(self
            .ctl
            .select_file(fixtures::source_file(file_name, size))
            .await
            .unwrap());
    }

    /// Starts a conversion on a separate task and waits until the transcoder has it.
    async fn start_held_conversion(&self) -> JoinHandle<Result<ConvertOutcome, WorkflowError>> {
        self.transcoder.hold().await;
        let ctl = Arc::clone(&self.ctl);
        let task = tokio::spawn(async move { ctl.convert().await });
        self.transcoder.wait_for_start().await;
        task
    }

    /// Polls until the session reaches `phase` or a second has passed.
    async fn wait_for_phase(&self, phase: SessionPhase) -> SessionPhase {
        for _ in 0..200 {
            let current = self.ctl.phase().await;
            if current == phase {
                return current;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.ctl.phase().await
    }

    /// Checks that a result exists exactly when the session is `Converted`.
    async fn assert_artifact_invariant(&self) {
        let snapshot = self.ctl.snapshot().await;
        assert_eq!(
            snapshot.artifact.is_some(),
            snapshot.phase == SessionPhase::Converted,
            "artifact/phase mismatch: {:?}",
            snapshot
        );
        assert_eq!(
            self.ctl.download().await.unwrap().is_some(),
            snapshot.phase == SessionPhase::Converted
        );
    }
}

fn drain(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn transitions(events: &[SessionEvent]) -> Vec<(SessionPhase, SessionPhase)> {
    events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::StateChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_convert_audio_to_mp3() {
    let h = TestHarness::new();
    h.ready(Category::Audio, "mp3", "song.wav", 1_000_000).await;

    let outcome = h.ctl.convert().await.unwrap();
    assert!(outcome.is_converted());
    assert_eq!(h.ctl.phase().await, SessionPhase::Converted);

    let artifact = h.ctl.download().await.unwrap().unwrap();
    assert_eq!(artifact.filename(), "song.mp3");
    assert_eq!(artifact.mime_type(), "audio/mpeg");
    assert_eq!(artifact.size_bytes(), 1_000_000);

    let recorded = h.transcoder.recorded_requests().await;
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].request.category, Category::Audio);
    assert_eq!(recorded[0].request.target_format, "mp3");
    assert_eq!(recorded[0].request.source.len(), 1_000_000);
}

#[tokio::test]
async fn test_reselect_format_after_conversion() {
    let h = TestHarness::new();
    h.ready(Category::Audio, "mp3", "song.wav", 1_000_000).await;
    h.ctl.convert().await.unwrap();

    assert!(h.ctl.select_format("flac").await.unwrap());
    let snapshot = h.ctl.snapshot().await;
    assert_eq!(snapshot.phase, SessionPhase::Selecting);
    assert_eq!(snapshot.artifact, None);
    assert_eq!(snapshot.file.as_ref().map(|f| f.name.as_str()), Some("song.wav"));

    h.ctl.convert().await.unwrap();
    let artifact = h.ctl.download().await.unwrap().unwrap();
    assert_eq!(artifact.filename(), "song.flac");
    assert_eq!(artifact.mime_type(), "audio/flac");
}

#[tokio::test]
async fn test_convert_without_file_is_noop() {
    let h = TestHarness::new();
    h.ctl.choose_category(Category::Audio).await;
    h.ctl.select_format("mp3").await.unwrap();

    let outcome = h.ctl.convert().await.unwrap();
    assert_eq!(outcome, ConvertOutcome::Skipped(SkipReason::MissingInput));

    let snapshot = h.ctl.snapshot().await;
    assert_eq!(snapshot.phase, SessionPhase::Selecting);
    assert_eq!(snapshot.artifact, None);
    assert_eq!(h.transcoder.call_count().await, 0);
}

#[tokio::test]
async fn test_transcoder_failure_returns_to_selecting() {
    let h = TestHarness::new();
    h.ready(Category::Audio, "mp3", "song.wav", 64).await;
    h.transcoder
        .set_next_error(TranscoderError::failed("encoder crashed", None))
        .await;

    let mut rx = h.ctl.subscribe();
    let err = h.ctl.convert().await.unwrap_err();
    assert!(matches!(err, WorkflowError::ConversionFailed { ref format, .. } if format == "mp3"));
    assert!(err.is_user_visible());

    let events = drain(&mut rx);
    assert_eq!(
        transitions(&events),
        vec![
            (SessionPhase::Selecting, SessionPhase::Converting),
            (SessionPhase::Converting, SessionPhase::Selecting),
        ]
    );
    assert!(events
        .iter()
        .any(|e| matches!(e, SessionEvent::ConversionFailed { format, .. } if format == "mp3")));

    let snapshot = h.ctl.snapshot().await;
    assert_eq!(snapshot.phase, SessionPhase::Selecting);
    assert_eq!(snapshot.artifact, None);
    assert!(snapshot.last_error.as_deref().unwrap().contains("encoder crashed"));
    assert!(snapshot.can_convert());

    // Manual retry succeeds and clears the error.
    assert!(h.ctl.convert().await.unwrap().is_converted());
    assert_eq!(h.ctl.snapshot().await.last_error, None);
}

#[tokio::test]
async fn test_unknown_format_keeps_selection() {
    let h = TestHarness::new();
    h.ctl.choose_category(Category::Audio).await;
    h.ctl.select_format("wav").await.unwrap();

    assert!(!h.ctl.select_format("xyz").await.unwrap());
    assert_eq!(h.ctl.snapshot().await.selected_format.as_deref(), Some("wav"));
}

// =============================================================================
// Properties
// =============================================================================

#[tokio::test]
async fn test_choose_category_is_idempotent() {
    let h = TestHarness::new();
    h.ctl.choose_category(Category::Video).await;
    let once = h.ctl.snapshot().await;
    h.ctl.choose_category(Category::Video).await;
    assert_eq!(h.ctl.snapshot().await, once);
}

#[tokio::test]
async fn test_artifact_exists_only_when_converted() {
    let h = TestHarness::new();
    h.assert_artifact_invariant().await;

    h.ctl.choose_category(Category::Video).await;
    h.assert_artifact_invariant().await;
    h.ctl.select_file(fixtures::video_file("clip.mov", 32)).await.unwrap();
    h.assert_artifact_invariant().await;
    h.ctl.convert().await.unwrap();
    h.assert_artifact_invariant().await;
    h.ctl.select_format("webm").await.unwrap();
    h.assert_artifact_invariant().await;
    h.ctl.convert().await.unwrap();
    h.assert_artifact_invariant().await;
    assert_eq!(h.ctl.phase().await, SessionPhase::Converted);
    h.ctl.select_file(fixtures::video_file("other.avi", 8)).await.unwrap();
    h.assert_artifact_invariant().await;
    h.ctl.convert().await.unwrap();
    h.assert_artifact_invariant().await;
    h.ctl.choose_category(Category::Audio).await;
    h.assert_artifact_invariant().await;
    h.ctl.reset().await;
    h.assert_artifact_invariant().await;
}

#[tokio::test]
async fn test_second_convert_while_in_flight_is_skipped() {
    let h = TestHarness::new();
    h.ready(Category::Audio, "ogg", "voice.m4a", 128).await;

    let first = h.start_held_conversion().await;
    assert_eq!(h.ctl.phase().await, SessionPhase::Converting);

    let second = h.ctl.convert().await.unwrap();
    assert_eq!(second, ConvertOutcome::Skipped(SkipReason::InFlight));

    // Inputs cannot change mid-conversion either.
    assert!(!h.ctl.select_format("mp3").await.unwrap());
    assert!(!h
        .ctl
        .select_file(fixtures::audio_file("other.wav", 4))
        .await
        .unwrap());

    h.transcoder.release().await;
    let outcome = first.await.unwrap().unwrap();
    assert!(outcome.is_converted());
    assert_eq!(h.transcoder.call_count().await, 1);
    assert_eq!(
        h.ctl.download().await.unwrap().unwrap().filename(),
        "voice.ogg"
    );
}

#[tokio::test]
async fn test_reset_during_conversion_discards_result() {
    let h = TestHarness::new();
    h.ready(Category::Audio, "mp3", "song.wav", 16).await;

    let superseded = mediaconv_core::metrics::CONVERSIONS_TOTAL
        .with_label_values(&["audio", "mp3", "superseded"]);
    let before = superseded.get();

    let task = h.start_held_conversion().await;
    h.ctl.reset().await;
    assert_eq!(h.ctl.phase().await, SessionPhase::Idle);

    h.transcoder.release().await;
    assert_eq!(task.await.unwrap().unwrap(), ConvertOutcome::Superseded);
    assert!(superseded.get() > before);

    let snapshot = h.ctl.snapshot().await;
    assert_eq!(snapshot.phase, SessionPhase::Idle);
    assert_eq!(snapshot.artifact, None);
}

#[tokio::test]
async fn test_category_change_during_conversion_discards_result() {
    let h = TestHarness::new();
    h.ready(Category::Audio, "mp3", "song.wav", 16).await;

    let task = h.start_held_conversion().await;
    h.ctl.choose_category(Category::Video).await;

    h.transcoder.release().await;
    assert_eq!(task.await.unwrap().unwrap(), ConvertOutcome::Superseded);

    let snapshot = h.ctl.snapshot().await;
    assert_eq!(snapshot.phase, SessionPhase::Selecting);
    assert_eq!(snapshot.category, Some(Category::Video));
    assert_eq!(snapshot.selected_format, None);
    assert_eq!(snapshot.file, None);
}

#[tokio::test]
async fn test_dropped_convert_future_still_completes() {
    let h = TestHarness::new();
    h.ready(Category::Video, "mkv", "clip.mp4", 16).await;

    let task = h.start_held_conversion().await;
    task.abort();
    let _ = task.await;

    h.transcoder.release().await;
    // The spawned transcode commits on its own.
    assert_eq!(
        h.wait_for_phase(SessionPhase::Converted).await,
        SessionPhase::Converted
    );
    assert_eq!(
        h.ctl.download().await.unwrap().unwrap().mime_type(),
        "video/x-matroska"
    );
}

#[tokio::test]
async fn test_transcoder_panic_returns_to_selecting() {
    let h = TestHarness::new();
    h.ready(Category::Audio, "flac", "live.wav", 16).await;
    h.transcoder.set_next_panic("encoder binding crashed").await;

    let err = h.ctl.convert().await.unwrap_err();
    assert!(matches!(err, WorkflowError::ConversionFailed { ref format, .. } if format == "flac"));

    let snapshot = h.ctl.snapshot().await;
    assert_eq!(snapshot.phase, SessionPhase::Selecting);
    assert_eq!(snapshot.artifact, None);
    assert!(snapshot.last_error.is_some());

    assert!(h.ctl.convert().await.unwrap().is_converted());
}

#[tokio::test]
async fn test_transcoder_panic_after_dropped_convert_returns_to_selecting() {
    let h = TestHarness::new();
    h.ready(Category::Audio, "flac", "live.wav", 16).await;
    h.transcoder.set_next_panic("encoder binding crashed").await;

    let task = h.start_held_conversion().await;
    task.abort();
    let _ = task.await;

    h.transcoder.release().await;
    assert_eq!(
        h.wait_for_phase(SessionPhase::Selecting).await,
        SessionPhase::Selecting
    );
    assert!(h.ctl.snapshot().await.last_error.is_some());

    // Not stuck behind the in-flight guard.
    assert!(h.ctl.convert().await.unwrap().is_converted());
    assert_eq!(h.transcoder.call_count().await, 2);
}

// =============================================================================
// Events
// =============================================================================

#[tokio::test]
async fn test_events_follow_transition_order() {
    let h = TestHarness::new();
    let mut rx = h.ctl.subscribe();

    h.ready(Category::Audio, "aac", "memo.wav", 10).await;
    h.ctl.convert().await.unwrap();
    h.ctl.select_format("m4a").await.unwrap();
    h.ctl.reset().await;

    let events = drain(&mut rx);
    assert_eq!(
        transitions(&events),
        vec![
            (SessionPhase::Idle, SessionPhase::Selecting),
            (SessionPhase::Selecting, SessionPhase::Converting),
            (SessionPhase::Converting, SessionPhase::Converted),
            (SessionPhase::Converted, SessionPhase::Selecting),
            (SessionPhase::Selecting, SessionPhase::Idle),
        ]
    );

    let ready: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::ArtifactReady(info) => Some(info.filename.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(ready, vec!["memo.aac"]);
}

// =============================================================================
// Strict mode
// =============================================================================

#[tokio::test]
async fn test_strict_mode_rejects_instead_of_ignoring() {
    let h = TestHarness::strict();

    let err = h.ctl.convert().await.unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::NotAllowed {
            operation: "convert",
            phase: SessionPhase::Idle
        }
    ));

    h.ready(Category::Video, "mp4", "clip.mov", 8).await;
    let err = h.ctl.select_format("flac").await.unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidFormatSelection { .. }));
    assert_eq!(h.ctl.snapshot().await.selected_format.as_deref(), Some("mp4"));

    let task = h.start_held_conversion().await;
    let err = h.ctl.convert().await.unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::NotAllowed {
            phase: SessionPhase::Converting,
            ..
        }
    ));
    h.transcoder.release().await;
    assert!(task.await.unwrap().unwrap().is_converted());
}

// =============================================================================
// Download sinks
// =============================================================================

#[tokio::test]
async fn test_download_to_fs_sink() {
    let h = TestHarness::new();
    let out = TempDir::new().unwrap();
    let sink = FsSink::new(SinkConfig::new(out.path().join("converted")));

    // Nothing to deliver yet.
    assert!(h.ctl.download_to(&sink).await.unwrap().is_none());

    h.ready(Category::Video, "webm", "holiday.mp4", 2048).await;
    h.transcoder.set_output(b"webm-bytes".to_vec()).await;
    h.ctl.convert().await.unwrap();

    let receipt = h.ctl.download_to(&sink).await.unwrap().unwrap();
    assert_eq!(receipt.filename, "holiday.webm");
    assert_eq!(receipt.mime_type, "video/webm");
    assert!(receipt.checksum.is_some());

    let written = tokio::fs::read(out.path().join("converted/holiday.webm"))
        .await
        .unwrap();
    assert_eq!(written, b"webm-bytes");

    // Downloading is a pure read: a second delivery gets a fresh name.
    let again = h.ctl.download_to(&sink).await.unwrap().unwrap();
    assert_eq!(again.filename, "holiday (1).webm");
    assert_eq!(h.ctl.phase().await, SessionPhase::Converted);
}

#[tokio::test]
async fn test_download_to_memory_sink_failure() {
    let h = TestHarness::new();
    h.ready(Category::Audio, "wav", "take.flac", 12).await;
    h.ctl.convert().await.unwrap();

    let sink = MemorySink::new();
    sink.set_next_error(mediaconv_core::SinkError::InvalidFilename {
        filename: "take.wav".to_string(),
    })
    .await;

    let err = h.ctl.download_to(&sink).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Sink(_)));
    assert_eq!(h.ctl.phase().await, SessionPhase::Converted);

    let receipt = h.ctl.download_to(&sink).await.unwrap().unwrap();
    assert_eq!(receipt.location, "memory://take.wav");
    let delivered = sink.deliveries().await;
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].mime_type, "audio/wav");
    assert_eq!(delivered[0].bytes.len(), 12);
}
