//! Configuration for workflow sessions.

use serde::{Deserialize, Serialize};

/// Session behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Report ignored requests (unknown format, missing input, download
    /// outside `Converted`, operations in the wrong phase) as errors instead
    /// of silently dropping them.
    #[serde(default)]
    pub strict: bool,

    /// Capacity of the observer event channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_event_buffer() -> usize {
    64
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            strict: false,
            event_buffer: default_event_buffer(),
        }
    }
}

impl SessionConfig {
    /// Returns a strict config.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Default::default()
        }
    }
}
