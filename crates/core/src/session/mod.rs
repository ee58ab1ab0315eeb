//! Session module: the conversion workflow state machine.
//!
//! A [`WorkflowController`] owns one session. The host feeds it user actions
//! (category, format, file, convert, download, reset) and renders from
//! [`SessionSnapshot`]s or the [`SessionEvent`] stream.
//!
//! # Example
//!
//! ```ignore
//! use mediaconv_core::formats::Category;
//! use mediaconv_core::session::{SourceFile, WorkflowController};
//! use mediaconv_core::transcoder::PassthroughTranscoder;
//!
//! let ctl = WorkflowController::new(Arc::new(PassthroughTranscoder::default()));
//! ctl.choose_category(Category::Audio).await;
//! ctl.select_format("mp3").await?;
//! ctl.select_file(SourceFile::from_path("song.wav").await?).await?;
//! ctl.convert().await?;
//!
//! let artifact = ctl.download().await?.expect("converted");
//! assert_eq!(artifact.filename(), "song.mp3");
//! ```

mod config;
mod controller;
mod error;
mod events;
mod state;
mod types;

pub use config::SessionConfig;
pub use controller::{ConvertOutcome, SkipReason, WorkflowController};
pub use error::WorkflowError;
pub use events::SessionEvent;
pub use state::{SessionPhase, SessionSnapshot};
pub use types::{output_filename, Artifact, ArtifactInfo, SourceFile, SourceFileInfo};
