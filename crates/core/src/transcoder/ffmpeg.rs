//! FFmpeg-based transcoder implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::fs;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use super::config::TranscoderConfig;
use super::error::TranscoderError;
use super::traits::Transcoder;
use super::types::TranscodeRequest;

/// Audio bitrate used for the audio track of video targets.
const VIDEO_AUDIO_BITRATE_KBPS: u32 = 192;

/// Encoder selection for one target format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EncoderPlan {
    video_codec: Option<&'static str>,
    audio_codec: &'static str,
    lossless_audio: bool,
}

impl EncoderPlan {
    const fn audio(codec: &'static str, lossless: bool) -> Self {
        Self {
            video_codec: None,
            audio_codec: codec,
            lossless_audio: lossless,
        }
    }

    const fn video(video: &'static str, audio: &'static str) -> Self {
        Self {
            video_codec: Some(video),
            audio_codec: audio,
            lossless_audio: false,
        }
    }

    /// Returns the encoder plan for a target format, if one is known.
    fn for_target(target: &str) -> Option<Self> {
        let plan = match target {
            "mp3" => Self::audio("libmp3lame", false),
            "wav" => Self::audio("pcm_s16le", true),
            "ogg" => Self::audio("libvorbis", false),
            "aac" | "m4a" => Self::audio("aac", false),
            "flac" => Self::audio("flac", true),
            "mp4" | "mov" | "mkv" => Self::video("libx264", "aac"),
            "webm" => Self::video("libvpx-vp9", "libopus"),
            "avi" => Self::video("mpeg4", "libmp3lame"),
            _ => return None,
        };
        Some(plan)
    }
}

/// Transcoder that runs an external ffmpeg binary over scratch files.
pub struct FfmpegTranscoder {
    config: TranscoderConfig,
}

impl FfmpegTranscoder {
    /// Creates a new FFmpeg transcoder with the given configuration.
    pub fn new(config: TranscoderConfig) -> Self {
        Self { config }
    }

    /// Creates a transcoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TranscoderConfig::default())
    }

    /// Builds ffmpeg arguments for one conversion.
    fn build_args(&self, input_path: &Path, output_path: &Path, plan: EncoderPlan) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(), // Overwrite output
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
        ];

        match plan.video_codec {
            Some(codec) => {
                args.extend(["-c:v".to_string(), codec.to_string()]);
                match codec {
                    "libx264" => {
                        args.extend(["-crf".to_string(), self.config.video_crf.to_string()]);
                    }
                    "libvpx-vp9" => {
                        // Constant quality mode for vp9 needs a zero target bitrate
                        args.extend([
                            "-crf".to_string(),
                            self.config.video_crf.to_string(),
                            "-b:v".to_string(),
                            "0".to_string(),
                        ]);
                    }
                    _ => {}
                }
            }
            // Drop embedded cover art and any other video streams
            None => args.push("-vn".to_string()),
        }

        args.extend(["-c:a".to_string(), plan.audio_codec.to_string()]);
        if !plan.lossless_audio {
            let bitrate = if plan.video_codec.is_some() {
                VIDEO_AUDIO_BITRATE_KBPS
            } else {
                self.config.audio_bitrate_kbps
            };
            args.extend(["-b:a".to_string(), format!("{}k", bitrate)]);
        }

        args.extend([
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
        ]);

        args.extend(self.config.extra_ffmpeg_args.iter().cloned());

        args.push(output_path.to_string_lossy().to_string());

        args
    }

    /// Returns the scratch input and output paths for a request.
    fn scratch_paths(&self, request: &TranscodeRequest) -> (PathBuf, PathBuf) {
        let input_ext = request
            .source_extension()
            .unwrap_or_else(|| "bin".to_string());
        let input = self
            .config
            .temp_dir
            .join(format!("{}-in.{}", request.job_id, input_ext));
        let output = self
            .config
            .temp_dir
            .join(format!("{}-out.{}", request.job_id, request.target_format));
        (input, output)
    }

    async fn remove_scratch(paths: [&Path; 2]) {
        for path in paths {
            if let Err(e) = fs::remove_file(path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to remove scratch file {:?}: {}", path, e);
                }
            }
        }
    }

    /// Writes the source, runs ffmpeg and reads back the output.
    async fn run_conversion(
        &self,
        request: &TranscodeRequest,
        plan: EncoderPlan,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<Vec<u8>, TranscoderError> {
        let start = Instant::now();

        fs::write(input_path, &request.source[..]).await?;

        let args = self.build_args(input_path, output_path, plan);

        let child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match timeout(Duration::from_secs(self.config.timeout_secs), child).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TranscoderError::FfmpegNotFound {
                    path: self.config.ffmpeg_path.clone(),
                });
            }
            Ok(Err(e)) => return Err(TranscoderError::Io(e)),
            // Dropping the output future kills the process
            Err(_) => {
                return Err(TranscoderError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(TranscoderError::failed(
                format!("FFmpeg exited with code: {:?}", output.status.code()),
                if stderr.is_empty() { None } else { Some(stderr) },
            ));
        }

        let bytes = fs::read(output_path)
            .await
            .map_err(|_| TranscoderError::OutputMissing {
                path: output_path.to_path_buf(),
            })?;

        tracing::info!(
            job_id = %request.job_id,
            target = %request.target_format,
            input_bytes = request.source.len(),
            output_bytes = bytes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "FFmpeg conversion finished"
        );

        Ok(bytes)
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn transcode(&self, request: TranscodeRequest) -> Result<Vec<u8>, TranscoderError> {
        let plan = EncoderPlan::for_target(&request.target_format)
            .ok_or_else(|| TranscoderError::unsupported_target(&request.target_format))?;

        if request.source.is_empty() {
            return Err(TranscoderError::EmptyInput);
        }

        fs::create_dir_all(&self.config.temp_dir)
            .await
            .map_err(|e| TranscoderError::TempDirFailed {
                path: self.config.temp_dir.clone(),
                source: e,
            })?;

        let (input_path, output_path) = self.scratch_paths(&request);
        let result = self
            .run_conversion(&request, plan, &input_path, &output_path)
            .await;
        Self::remove_scratch([&input_path, &output_path]).await;

        result
    }

    async fn validate(&self) -> Result<(), TranscoderError> {
        let result = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await;

        if let Err(e) = result {
            if e.kind() == std::io::ErrorKind::NotFound {
                return Err(TranscoderError::FfmpegNotFound {
                    path: self.config.ffmpeg_path.clone(),
                });
            }
            return Err(TranscoderError::Io(e));
        }

        fs::create_dir_all(&self.config.temp_dir)
            .await
            .map_err(|e| TranscoderError::TempDirFailed {
                path: self.config.temp_dir.clone(),
                source: e,
            })?;

        Ok(())
    }
}
