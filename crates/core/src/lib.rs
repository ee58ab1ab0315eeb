pub mod config;
pub mod formats;
pub mod metrics;
pub mod session;
pub mod sink;
pub mod testing;
pub mod transcoder;

pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use formats::{formats_for, mime_type_for, Category, FormatCatalog};
pub use session::{
    Artifact, ConvertOutcome, SessionConfig, SessionEvent, SessionPhase, SessionSnapshot,
    SourceFile, WorkflowController, WorkflowError,
};
pub use sink::{create_sink, DeliveryReceipt, DownloadSink, FsSink, SinkConfig, SinkError};
pub use transcoder::{
    create_transcoder, TranscodeRequest, Transcoder, TranscoderConfig, TranscoderError,
};
