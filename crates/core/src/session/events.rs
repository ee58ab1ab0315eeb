//! Events broadcast to session observers.

use serde::{Deserialize, Serialize};

use super::state::SessionPhase;
use super::types::ArtifactInfo;
use crate::formats::Category;

/// A change observers may want to re-render for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The session moved to another phase.
    StateChanged {
        from: SessionPhase,
        to: SessionPhase,
    },
    /// Category, format or file changed without a phase change.
    SelectionChanged {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<Category>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_name: Option<String>,
    },
    /// A conversion finished and its artifact can be downloaded.
    ArtifactReady(ArtifactInfo),
    /// The transcoder reported failure; the session is back in `Selecting`.
    ConversionFailed { format: String, reason: String },
}
