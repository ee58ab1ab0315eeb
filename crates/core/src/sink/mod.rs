//! Download sink module: where converted artifacts end up.
//!
//! The workflow only exposes the artifact; a [`DownloadSink`] decides how to
//! persist or offer it. [`FsSink`] writes into a directory and never clobbers
//! an existing file unless configured to.

mod config;
mod error;
mod fs_sink;
mod traits;
mod types;

pub use config::SinkConfig;
pub use error::SinkError;
pub use fs_sink::FsSink;
pub use traits::DownloadSink;
pub use types::DeliveryReceipt;

/// Factory function to create a sink from config.
pub fn create_sink(config: &SinkConfig) -> Box<dyn DownloadSink> {
    Box::new(FsSink::new(config.clone()))
}
