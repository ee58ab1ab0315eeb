//! Workflow controller implementation.
//!
//! Drives a single conversion session through its phases:
//! `Idle -> Selecting -> Converting -> Converted`, back to `Selecting` when an
//! input changes and to `Idle` on reset.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::formats::{mime_type_for, Category, FormatCatalog};
use crate::metrics;
use crate::sink::{DeliveryReceipt, DownloadSink};
use crate::transcoder::{create_transcoder, TranscodeRequest, Transcoder, TranscoderError};

use super::config::SessionConfig;
use super::error::WorkflowError;
use super::events::SessionEvent;
use super::state::{SessionPhase, SessionSnapshot, SessionState};
use super::types::{output_filename, Artifact, ArtifactInfo, SourceFile};

/// Why a convert request did not invoke the transcoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Source file and/or target format not selected yet.
    MissingInput,
    /// A conversion is already running for this session.
    InFlight,
    /// Session is idle or already holds a result.
    NotSelecting,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::MissingInput => "missing_input",
            SkipReason::InFlight => "in_flight",
            SkipReason::NotSelecting => "not_selecting",
        }
    }
}

/// Result of a convert request that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertOutcome {
    /// The artifact was produced and the session is `Converted`.
    Converted(ArtifactInfo),
    /// Nothing happened.
    Skipped(SkipReason),
    /// The session was reset or re-categorized while converting; the result
    /// was dropped.
    Superseded,
}

impl ConvertOutcome {
    pub fn is_converted(&self) -> bool {
        matches!(self, ConvertOutcome::Converted(_))
    }
}

/// Mutable session data guarded by the controller's lock.
#[derive(Debug, Default)]
struct Session {
    state: SessionState,
    /// Bumped whenever the session is discarded, so late results can be told apart.
    epoch: u64,
    last_error: Option<String>,
}

/// State shared with in-flight conversion tasks.
struct Shared {
    session: RwLock<Session>,
    events: broadcast::Sender<SessionEvent>,
}

impl Shared {
    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn emit_transition(&self, from: SessionPhase, to: SessionPhase) {
        if from != to {
            info!(from = %from, to = %to, "Session transition");
            self.emit(SessionEvent::StateChanged { from, to });
        }
    }

    fn emit_selection(&self, state: &SessionState) {
        self.emit(SessionEvent::SelectionChanged {
            category: state.category(),
            format: state.format().map(str::to_string),
            file_name: state.file().map(|f| f.name().to_string()),
        });
    }

    /// Runs the transcoder and commits its result.
    ///
    /// The transcode runs on its own task so a panic is committed as a failure
    /// even when nobody awaits the caller's `convert` future.
    async fn run_conversion(
        self: Arc<Self>,
        transcoder: Arc<dyn Transcoder>,
        request: TranscodeRequest,
        epoch: u64,
    ) -> Result<ConvertOutcome, WorkflowError> {
        let started = Instant::now();
        let category = request.category;
        let format = request.target_format.clone();

        let transcode = tokio::spawn(async move { transcoder.transcode(request).await });
        let result = match transcode.await {
            Ok(result) => result,
            Err(e) => Err(TranscoderError::failed(
                format!("transcoder task aborted: {}", e),
                None,
            )),
        };

        self.commit(epoch, category, &format, result, started).await
    }

    /// Applies a finished conversion if its session is still current.
    async fn commit(
        &self,
        epoch: u64,
        requested_category: Category,
        requested_format: &str,
        result: Result<Vec<u8>, TranscoderError>,
        started: Instant,
    ) -> Result<ConvertOutcome, WorkflowError> {
        let mut session = self.session.write().await;

        let current = session.epoch == epoch && session.state.phase() == SessionPhase::Converting;
        if !current {
            debug!(epoch, current_epoch = session.epoch, "Discarding superseded conversion");
            metrics::CONVERSIONS_TOTAL
                .with_label_values(&[requested_category.as_str(), requested_format, "superseded"])
                .inc();
            return Ok(ConvertOutcome::Superseded);
        }

        let SessionState::Converting {
            category,
            format,
            file,
        } = std::mem::take(&mut session.state)
        else {
            return Ok(ConvertOutcome::Superseded);
        };

        metrics::CONVERSION_DURATION
            .with_label_values(&[category.as_str()])
            .observe(started.elapsed().as_secs_f64());

        match result {
            Ok(bytes) => {
                let artifact = Artifact::new(
                    Arc::from(bytes),
                    output_filename(file.name(), &format),
                    mime_type_for(&format),
                    format.clone(),
                );
                let artifact_info = artifact.info();

                info!(
                    source = %file.name(),
                    filename = %artifact_info.filename,
                    mime_type = %artifact_info.mime_type,
                    bytes = artifact_info.size_bytes,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Conversion completed"
                );
                metrics::CONVERSIONS_TOTAL
                    .with_label_values(&[category.as_str(), &format, "success"])
                    .inc();

                session.state = SessionState::Converted {
                    category,
                    format,
                    file,
                    artifact,
                };
                session.last_error = None;
                self.emit_transition(SessionPhase::Converting, SessionPhase::Converted);
                self.emit(SessionEvent::ArtifactReady(artifact_info.clone()));

                Ok(ConvertOutcome::Converted(artifact_info))
            }
            Err(e) => {
                warn!(
                    source = %file.name(),
                    format = %format,
                    error = %e,
                    "Conversion failed"
                );
                metrics::CONVERSIONS_TOTAL
                    .with_label_values(&[category.as_str(), &format, "failed"])
                    .inc();

                let reason = e.to_string();
                session.state = SessionState::Selecting {
                    category,
                    format: Some(format.clone()),
                    file: Some(file),
                };
                session.last_error = Some(reason.clone());
                self.emit_transition(SessionPhase::Converting, SessionPhase::Selecting);
                self.emit(SessionEvent::ConversionFailed {
                    format: format.clone(),
                    reason,
                });

                Err(WorkflowError::ConversionFailed { format, source: e })
            }
        }
    }
}

/// The conversion workflow state machine.
///
/// All methods take `&self`; wrap the controller in an `Arc` to drive it from
/// several tasks. Transcoding runs on a spawned task, so dropping a `convert`
/// future does not leave the session stuck in `Converting`, even if the
/// transcoder then panics.
pub struct WorkflowController {
    config: SessionConfig,
    transcoder: Arc<dyn Transcoder>,
    shared: Arc<Shared>,
}

impl WorkflowController {
    /// Creates a permissive controller around the given transcoder.
    pub fn new(transcoder: Arc<dyn Transcoder>) -> Self {
        Self::with_config(transcoder, SessionConfig::default())
    }

    /// Creates a controller with explicit session settings.
    pub fn with_config(transcoder: Arc<dyn Transcoder>, config: SessionConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_buffer.max(1));

        Self {
            config,
            transcoder,
            shared: Arc::new(Shared {
                session: RwLock::new(Session::default()),
                events,
            }),
        }
    }

    /// Creates a controller with the transcoder and session settings from `config`.
    pub fn from_config(config: &Config) -> Self {
        let transcoder: Arc<dyn Transcoder> = Arc::from(create_transcoder(&config.transcoder));
        Self::with_config(transcoder, config.session.clone())
    }

    /// Like [`from_config`](Self::from_config), but fails when the configured
    /// transcoder is not ready (e.g. the ffmpeg binary is missing).
    pub async fn from_config_validated(config: &Config) -> Result<Self, TranscoderError> {
        let controller = Self::from_config(config);
        controller.transcoder.validate().await?;
        info!(
            transcoder = %controller.transcoder.name(),
            strict = controller.config.strict,
            "Workflow controller ready"
        );
        Ok(controller)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the transcoder this controller delegates to.
    pub fn transcoder(&self) -> &Arc<dyn Transcoder> {
        &self.transcoder
    }

    /// Subscribes to session events.
    ///
    /// Receivers that fall more than `event_buffer` events behind observe a
    /// lag error and should re-read [`WorkflowController::snapshot`].
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }

    /// Current phase.
    pub async fn phase(&self) -> SessionPhase {
        self.shared.session.read().await.state.phase()
    }

    /// Point-in-time view of the session.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let session = self.shared.session.read().await;
        SessionSnapshot::capture(&session.state, session.last_error.as_deref())
    }

    /// Formats selectable in the current category, empty while idle.
    pub async fn available_formats(&self) -> &'static [&'static str] {
        match self.shared.session.read().await.state.category() {
            Some(category) => FormatCatalog::standard().formats_for(category),
            None => &[],
        }
    }

    /// Reports an ignored request: logged in permissive mode, returned in strict mode.
    fn ignore<T>(&self, err: WorkflowError, value: T) -> Result<T, WorkflowError> {
        if self.config.strict {
            return Err(err);
        }
        debug!(error = %err, "Ignoring request");
        Ok(value)
    }

    /// Sets the category and clears format, file and result. Valid in any phase.
    ///
    /// A conversion still in flight is abandoned; its result will be discarded.
    pub async fn choose_category(&self, category: Category) {
        let mut session = self.shared.session.write().await;
        let from = session.state.phase();

        session.epoch += 1;
        session.state = SessionState::Selecting {
            category,
            format: None,
            file: None,
        };
        session.last_error = None;

        info!(category = %category, "Category chosen");
        self.shared.emit_transition(from, SessionPhase::Selecting);
        self.shared.emit_selection(&session.state);
    }

    /// Selects the target format.
    ///
    /// Returns `Ok(true)` when applied. A format outside the current category,
    /// or a call while idle or converting, is ignored (`Ok(false)`, or an error
    /// in strict mode). Selecting while `Converted` drops the result.
    pub async fn select_format(&self, format: &str) -> Result<bool, WorkflowError> {
        let mut session = self.shared.session.write().await;
        let from = session.state.phase();

        let (category, file) = match &session.state {
            SessionState::Selecting { category, .. } => (*category, None),
            SessionState::Converted { category, file, .. } => (*category, Some(file.clone())),
            SessionState::Idle | SessionState::Converting { .. } => {
                return self.ignore(
                    WorkflowError::NotAllowed {
                        operation: "select a format",
                        phase: from,
                    },
                    false,
                );
            }
        };

        if !FormatCatalog::standard().contains(category, format) {
            return self.ignore(
                WorkflowError::InvalidFormatSelection {
                    format: format.to_string(),
                    category,
                },
                false,
            );
        }

        if let SessionState::Selecting {
            format: selected, ..
        } = &mut session.state
        {
            *selected = Some(format.to_string());
        } else {
            session.state = SessionState::Selecting {
                category,
                format: Some(format.to_string()),
                file,
            };
        }
        session.last_error = None;

        debug!(format = %format, "Format selected");
        self.shared.emit_transition(from, SessionPhase::Selecting);
        self.shared.emit_selection(&session.state);
        Ok(true)
    }

    /// Replaces the source file. No type or size validation happens here.
    ///
    /// Returns `Ok(true)` when applied; ignored while idle or converting.
    /// Selecting while `Converted` drops the result.
    pub async fn select_file(&self, file: SourceFile) -> Result<bool, WorkflowError> {
        let mut session = self.shared.session.write().await;
        let from = session.state.phase();

        let file_name = file.name().to_string();
        let file_size = file.size();

        match &mut session.state {
            SessionState::Selecting { file: selected, .. } => {
                *selected = Some(file);
            }
            SessionState::Converted {
                category, format, ..
            } => {
                let next = SessionState::Selecting {
                    category: *category,
                    format: Some(std::mem::take(format)),
                    file: Some(file),
                };
                session.state = next;
            }
            SessionState::Idle | SessionState::Converting { .. } => {
                return self.ignore(
                    WorkflowError::NotAllowed {
                        operation: "select a file",
                        phase: from,
                    },
                    false,
                );
            }
        }
        session.last_error = None;

        debug!(file = %file_name, size = file_size, "Source file selected");
        self.shared.emit_transition(from, SessionPhase::Selecting);
        self.shared.emit_selection(&session.state);
        Ok(true)
    }

    /// Runs the transcoder on the selected file and format.
    ///
    /// Only valid in `Selecting` with both inputs present; otherwise the
    /// request is skipped (or rejected in strict mode). A transcoder failure
    /// returns the session to `Selecting` and is always reported as
    /// [`WorkflowError::ConversionFailed`].
    pub async fn convert(&self) -> Result<ConvertOutcome, WorkflowError> {
        let (request, epoch) = {
            let mut session = self.shared.session.write().await;
            let from = session.state.phase();

            let (category, format, file) = match &session.state {
                SessionState::Selecting {
                    category,
                    format: Some(format),
                    file: Some(file),
                } => (*category, format.clone(), file.clone()),
                SessionState::Selecting { format, file, .. } => {
                    let missing = match (format.is_some(), file.is_some()) {
                        (true, false) => "a source file",
                        (false, true) => "a target format",
                        _ => "a source file and a target format",
                    };
                    return self.skip(WorkflowError::MissingInput { missing }, SkipReason::MissingInput);
                }
                SessionState::Converting { .. } => {
                    return self.skip(
                        WorkflowError::NotAllowed {
                            operation: "convert",
                            phase: from,
                        },
                        SkipReason::InFlight,
                    );
                }
                SessionState::Idle | SessionState::Converted { .. } => {
                    return self.skip(
                        WorkflowError::NotAllowed {
                            operation: "convert",
                            phase: from,
                        },
                        SkipReason::NotSelecting,
                    );
                }
            };

            let request =
                TranscodeRequest::new(file.name(), Arc::clone(file.content()), category, &format);
            info!(
                job_id = %request.job_id,
                source = %file.name(),
                size = file.size(),
                category = %category,
                format = %format,
                transcoder = %self.transcoder.name(),
                "Starting conversion"
            );

            session.state = SessionState::Converting {
                category,
                format,
                file,
            };
            self.shared.emit_transition(from, SessionPhase::Converting);
            (request, session.epoch)
        };
        let request_format = request.target_format.clone();

        let handle = tokio::spawn(
            Arc::clone(&self.shared).run_conversion(Arc::clone(&self.transcoder), request, epoch),
        );

        match handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(WorkflowError::ConversionFailed {
                format: request_format,
                source: TranscoderError::failed(format!("conversion task aborted: {}", e), None),
            }),
        }
    }

    fn skip(&self, err: WorkflowError, reason: SkipReason) -> Result<ConvertOutcome, WorkflowError> {
        metrics::CONVERSIONS_SKIPPED
            .with_label_values(&[reason.as_str()])
            .inc();
        self.ignore(err, ConvertOutcome::Skipped(reason))
    }

    /// Returns the converted artifact. Pure read, valid only in `Converted`.
    pub async fn download(&self) -> Result<Option<Artifact>, WorkflowError> {
        let session = self.shared.session.read().await;

        match session.state.artifact() {
            Some(artifact) => {
                metrics::DOWNLOADS_TOTAL.with_label_values(&["exposed"]).inc();
                Ok(Some(artifact.clone()))
            }
            None => {
                metrics::DOWNLOADS_TOTAL
                    .with_label_values(&["unavailable"])
                    .inc();
                self.ignore(
                    WorkflowError::DownloadUnavailable {
                        phase: session.state.phase(),
                    },
                    None,
                )
            }
        }
    }

    /// Hands the artifact to a sink. Returns `Ok(None)` when there is nothing
    /// to download.
    pub async fn download_to(
        &self,
        sink: &dyn DownloadSink,
    ) -> Result<Option<DeliveryReceipt>, WorkflowError> {
        let Some(artifact) = self.download().await? else {
            return Ok(None);
        };

        match sink.deliver(&artifact).await {
            Ok(receipt) => {
                info!(
                    sink = %sink.name(),
                    location = %receipt.location,
                    bytes = receipt.size_bytes,
                    "Artifact delivered"
                );
                metrics::DOWNLOADS_TOTAL.with_label_values(&["delivered"]).inc();
                Ok(Some(receipt))
            }
            Err(e) => {
                warn!(sink = %sink.name(), error = %e, "Artifact delivery failed");
                metrics::DOWNLOADS_TOTAL.with_label_values(&["failed"]).inc();
                Err(e.into())
            }
        }
    }

    /// Clears all session data and returns to `Idle`. Valid in any phase.
    pub async fn reset(&self) {
        let mut session = self.shared.session.write().await;
        let from = session.state.phase();

        session.epoch += 1;
        session.state = SessionState::Idle;
        session.last_error = None;

        info!("Session reset");
        self.shared.emit_transition(from, SessionPhase::Idle);
    }
}
