//! Types for the sink module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Proof that an artifact was handed over to a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Where the artifact went (a path for file sinks).
    pub location: String,
    /// Final file name, which may differ from the artifact's on collision.
    pub filename: String,
    /// Content type the artifact was delivered with.
    pub mime_type: String,
    /// Bytes delivered.
    pub size_bytes: u64,
    /// SHA-256 of the delivered bytes, hex encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// When the delivery completed.
    pub delivered_at: DateTime<Utc>,
}
