//! Trait definitions for the sink module.

use async_trait::async_trait;

use super::error::SinkError;
use super::types::DeliveryReceipt;
use crate::session::Artifact;

/// Persists or offers a converted artifact to the user.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Returns the name of this sink implementation.
    fn name(&self) -> &str;

    /// Delivers the artifact's bytes under its filename and content type.
    async fn deliver(&self, artifact: &Artifact) -> Result<DeliveryReceipt, SinkError>;
}
