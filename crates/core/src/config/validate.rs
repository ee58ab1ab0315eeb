use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Transcoder timeout is not 0
/// - ffmpeg path is set when the ffmpeg backend is selected
/// - Session event buffer is not 0
/// - Sink output directory is set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    use super::types::TranscoderBackend;

    if config.transcoder.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "transcoder.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.transcoder.backend == TranscoderBackend::Ffmpeg
        && config.transcoder.ffmpeg_path.as_os_str().is_empty()
    {
        return Err(ConfigError::ValidationError(
            "transcoder.ffmpeg_path cannot be empty".to_string(),
        ));
    }

    if config.session.event_buffer == 0 {
        return Err(ConfigError::ValidationError(
            "session.event_buffer cannot be 0".to_string(),
        ));
    }

    if config.sink.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "sink.output_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}
