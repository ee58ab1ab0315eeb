//! Session state machine types.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::{Artifact, ArtifactInfo, SourceFile, SourceFileInfo};
use crate::formats::Category;

/// Phase of a conversion session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No category chosen.
    Idle,
    /// Category chosen; gathering format and file.
    Selecting,
    /// Conversion in flight.
    Converting,
    /// Result ready for download.
    Converted,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Selecting => "selecting",
            SessionPhase::Converting => "converting",
            SessionPhase::Converted => "converted",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session data, tagged by phase.
///
/// Format and file are mandatory once a conversion starts, and an artifact
/// only exists in `Converted`.
#[derive(Debug, Clone, Default)]
pub(crate) enum SessionState {
    #[default]
    Idle,
    Selecting {
        category: Category,
        format: Option<String>,
        file: Option<SourceFile>,
    },
    Converting {
        category: Category,
        format: String,
        file: SourceFile,
    },
    Converted {
        category: Category,
        format: String,
        file: SourceFile,
        artifact: Artifact,
    },
}

impl SessionState {
    pub(crate) fn phase(&self) -> SessionPhase {
        match self {
            SessionState::Idle => SessionPhase::Idle,
            SessionState::Selecting { .. } => SessionPhase::Selecting,
            SessionState::Converting { .. } => SessionPhase::Converting,
            SessionState::Converted { .. } => SessionPhase::Converted,
        }
    }

    pub(crate) fn category(&self) -> Option<Category> {
        match self {
            SessionState::Idle => None,
            SessionState::Selecting { category, .. }
            | SessionState::Converting { category, .. }
            | SessionState::Converted { category, .. } => Some(*category),
        }
    }

    pub(crate) fn format(&self) -> Option<&str> {
        match self {
            SessionState::Idle => None,
            SessionState::Selecting { format, .. } => format.as_deref(),
            SessionState::Converting { format, .. } | SessionState::Converted { format, .. } => {
                Some(format)
            }
        }
    }

    pub(crate) fn file(&self) -> Option<&SourceFile> {
        match self {
            SessionState::Idle => None,
            SessionState::Selecting { file, .. } => file.as_ref(),
            SessionState::Converting { file, .. } | SessionState::Converted { file, .. } => {
                Some(file)
            }
        }
    }

    pub(crate) fn artifact(&self) -> Option<&Artifact> {
        match self {
            SessionState::Converted { artifact, .. } => Some(artifact),
            _ => None,
        }
    }
}

/// Point-in-time view of a session for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<SourceFileInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactInfo>,
    /// Message of the last failed conversion, until inputs change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl SessionSnapshot {
    pub(crate) fn capture(state: &SessionState, last_error: Option<&str>) -> Self {
        Self {
            phase: state.phase(),
            category: state.category(),
            selected_format: state.format().map(str::to_string),
            file: state.file().map(SourceFile::info),
            artifact: state.artifact().map(Artifact::info),
            last_error: last_error.map(str::to_string),
        }
    }

    /// Whether the convert trigger should be enabled.
    pub fn can_convert(&self) -> bool {
        self.phase == SessionPhase::Selecting
            && self.selected_format.is_some()
            && self.file.is_some()
    }
}
