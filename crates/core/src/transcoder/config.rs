//! Configuration for the transcoder module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which transcoder implementation to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscoderBackend {
    /// Returns the source bytes unchanged after a simulated delay.
    #[default]
    Passthrough,
    /// Pipes the source through an external ffmpeg binary.
    Ffmpeg,
}

/// Configuration for transcoders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscoderConfig {
    /// Implementation to use.
    #[serde(default)]
    pub backend: TranscoderBackend,

    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Scratch directory for ffmpeg input/output files.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Timeout for a single ffmpeg run in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,

    /// Additional global ffmpeg arguments, inserted before the output path.
    #[serde(default)]
    pub extra_ffmpeg_args: Vec<String>,

    /// Audio bitrate for lossy targets in kbps.
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate_kbps: u32,

    /// Constant Rate Factor for x264/vp9 video targets.
    #[serde(default = "default_video_crf")]
    pub video_crf: u8,

    /// Delay the passthrough stub waits before answering, in milliseconds.
    #[serde(default = "default_simulated_delay")]
    pub simulated_delay_ms: u64,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("mediaconv")
}

fn default_timeout() -> u64 {
    1800 // 30 minutes
}

fn default_log_level() -> String {
    "error".to_string()
}

fn default_audio_bitrate() -> u32 {
    320
}

fn default_video_crf() -> u8 {
    23
}

fn default_simulated_delay() -> u64 {
    2000
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            backend: TranscoderBackend::default(),
            ffmpeg_path: default_ffmpeg_path(),
            temp_dir: default_temp_dir(),
            timeout_secs: default_timeout(),
            ffmpeg_log_level: default_log_level(),
            extra_ffmpeg_args: Vec::new(),
            audio_bitrate_kbps: default_audio_bitrate(),
            video_crf: default_video_crf(),
            simulated_delay_ms: default_simulated_delay(),
        }
    }
}

impl TranscoderConfig {
    /// Creates an ffmpeg-backed config using the given binary.
    pub fn ffmpeg(ffmpeg_path: PathBuf) -> Self {
        Self {
            backend: TranscoderBackend::Ffmpeg,
            ffmpeg_path,
            ..Default::default()
        }
    }

    /// Sets the temp directory.
    pub fn with_temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.temp_dir = temp_dir;
        self
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Sets the passthrough stub delay in milliseconds.
    pub fn with_simulated_delay(mut self, delay_ms: u64) -> Self {
        self.simulated_delay_ms = delay_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TranscoderConfig::default();
        assert_eq!(config.backend, TranscoderBackend::Passthrough);
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.timeout_secs, 1800);
        assert_eq!(config.simulated_delay_ms, 2000);
        assert_eq!(config.audio_bitrate_kbps, 320);
    }

    #[test]
    fn test_config_builder() {
        let config = TranscoderConfig::ffmpeg(PathBuf::from("/usr/local/bin/ffmpeg"))
            .with_temp_dir(PathBuf::from("/tmp/test"))
            .with_timeout(60);

        assert_eq!(config.backend, TranscoderBackend::Ffmpeg);
        assert_eq!(config.ffmpeg_path, PathBuf::from("/usr/local/bin/ffmpeg"));
        assert_eq!(config.temp_dir, PathBuf::from("/tmp/test"));
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: TranscoderConfig = toml::from_str(
            r#"
backend = "ffmpeg"
video_crf = 28
"#,
        )
        .unwrap();
        assert_eq!(config.backend, TranscoderBackend::Ffmpeg);
        assert_eq!(config.video_crf, 28);
        assert_eq!(config.ffmpeg_log_level, "error");
    }
}
