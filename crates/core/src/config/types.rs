use serde::{Deserialize, Serialize};

pub use crate::session::SessionConfig;
pub use crate::sink::SinkConfig;
pub use crate::transcoder::{TranscoderBackend, TranscoderConfig};

/// Root configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub transcoder: TranscoderConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub sink: SinkConfig,
}
