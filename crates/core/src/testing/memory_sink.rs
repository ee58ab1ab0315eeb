//! In-memory download sink for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::session::Artifact;
use crate::sink::{DeliveryReceipt, DownloadSink, SinkError};

/// An artifact captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Sink that keeps delivered artifacts in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    deliveries: Arc<RwLock<Vec<DeliveredFile>>>,
    /// If set, the next delivery will fail with this error.
    next_error: Arc<RwLock<Option<SinkError>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all delivered files, oldest first.
    pub async fn deliveries(&self) -> Vec<DeliveredFile> {
        self.deliveries.read().await.clone()
    }

    /// Configure the next delivery to fail with the given error.
    pub async fn set_next_error(&self, error: SinkError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl DownloadSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    async fn deliver(&self, artifact: &Artifact) -> Result<DeliveryReceipt, SinkError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        self.deliveries.write().await.push(DeliveredFile {
            filename: artifact.filename().to_string(),
            mime_type: artifact.mime_type().to_string(),
            bytes: artifact.bytes().to_vec(),
        });

        Ok(DeliveryReceipt {
            location: format!("memory://{}", artifact.filename()),
            filename: artifact.filename().to_string(),
            mime_type: artifact.mime_type().to_string(),
            size_bytes: artifact.size_bytes(),
            checksum: None,
            delivered_at: Utc::now(),
        })
    }
}
