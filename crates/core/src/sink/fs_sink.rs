//! File system sink implementation.

use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::config::SinkConfig;
use super::error::SinkError;
use super::traits::DownloadSink;
use super::types::DeliveryReceipt;
use crate::session::Artifact;

/// Upper bound on `name (n).ext` candidates tried before giving up.
const MAX_NAME_SUFFIX: u32 = 999;

/// Writes artifacts into a directory on disk.
pub struct FsSink {
    config: SinkConfig,
}

impl FsSink {
    /// Creates a new file system sink with the given configuration.
    pub fn new(config: SinkConfig) -> Self {
        Self { config }
    }

    /// Creates a sink with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SinkConfig::default())
    }

    /// Returns the directory artifacts are written to.
    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    /// Rejects names that would escape the output directory.
    fn validate_filename(filename: &str) -> Result<(), SinkError> {
        let is_plain = !filename.is_empty()
            && !filename.contains(['/', '\\'])
            && filename != "."
            && filename != "..";
        if is_plain {
            Ok(())
        } else {
            Err(SinkError::InvalidFilename {
                filename: filename.to_string(),
            })
        }
    }

    /// Returns `name (n).ext` for the n-th collision.
    fn numbered_name(filename: &str, n: u32) -> String {
        match filename.rfind('.') {
            Some(idx) if idx > 0 => format!("{} ({}){}", &filename[..idx], n, &filename[idx..]),
            _ => format!("{} ({})", filename, n),
        }
    }

    async fn ensure_output_dir(&self) -> Result<(), SinkError> {
        let dir = &self.config.output_dir;
        if fs::metadata(dir).await.map(|m| m.is_dir()).unwrap_or(false) {
            return Ok(());
        }
        if !self.config.create_dirs {
            return Err(SinkError::DirectoryNotFound { path: dir.clone() });
        }
        fs::create_dir_all(dir)
            .await
            .map_err(|e| SinkError::DirectoryCreationFailed {
                path: dir.clone(),
                source: e,
            })
    }

    /// Opens the destination file, picking a free name unless overwriting.
    async fn open_destination(&self, filename: &str) -> Result<(PathBuf, fs::File), SinkError> {
        if self.config.overwrite {
            let path = self.config.output_dir.join(filename);
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path)
                .await
                .map_err(|e| SinkError::WriteFailed {
                    path: path.clone(),
                    source: e,
                })?;
            return Ok((path, file));
        }

        for n in 0..=MAX_NAME_SUFFIX {
            let candidate = if n == 0 {
                filename.to_string()
            } else {
                Self::numbered_name(filename, n)
            };
            let path = self.config.output_dir.join(&candidate);

            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(SinkError::WriteFailed { path, source: e }),
            }
        }

        Err(SinkError::DestinationExists {
            path: self.config.output_dir.join(filename),
        })
    }
}

#[async_trait]
impl DownloadSink for FsSink {
    fn name(&self) -> &str {
        "fs"
    }

    async fn deliver(&self, artifact: &Artifact) -> Result<DeliveryReceipt, SinkError> {
        Self::validate_filename(artifact.filename())?;
        self.ensure_output_dir().await?;

        let (path, mut file) = self.open_destination(artifact.filename()).await?;

        let write = async {
            file.write_all(artifact.bytes()).await?;
            file.flush().await
        };
        if let Err(e) = write.await {
            let _ = fs::remove_file(&path).await;
            return Err(SinkError::WriteFailed { path, source: e });
        }

        let checksum = self
            .config
            .checksum
            .then(|| format!("{:x}", Sha256::digest(artifact.bytes())));

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| artifact.filename().to_string());

        tracing::info!(
            path = %path.display(),
            bytes = artifact.size_bytes(),
            mime_type = %artifact.mime_type(),
            "Artifact written"
        );

        Ok(DeliveryReceipt {
            location: path.to_string_lossy().into_owned(),
            filename,
            mime_type: artifact.mime_type().to_string(),
            size_bytes: artifact.size_bytes(),
            checksum,
            delivered_at: Utc::now(),
        })
    }
}
