//! Configuration for the sink module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the file system sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Directory converted files are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Replace an existing file with the same name instead of picking a free one.
    #[serde(default)]
    pub overwrite: bool,

    /// Create the output directory when missing.
    #[serde(default = "default_true")]
    pub create_dirs: bool,

    /// Record a SHA-256 checksum in the receipt.
    #[serde(default = "default_true")]
    pub checksum: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("converted")
}

fn default_true() -> bool {
    true
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            overwrite: false,
            create_dirs: true,
            checksum: true,
        }
    }
}

impl SinkConfig {
    /// Creates a config writing into `output_dir`.
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            ..Default::default()
        }
    }

    /// Enables or disables overwriting existing files.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Enables or disables creating the output directory.
    pub fn with_create_dirs(mut self, create_dirs: bool) -> Self {
        self.create_dirs = create_dirs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SinkConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("converted"));
        assert!(!config.overwrite);
        assert!(config.create_dirs);
        assert!(config.checksum);
    }

    #[test]
    fn test_config_builder() {
        let config = SinkConfig::new(PathBuf::from("/downloads"))
            .with_overwrite(true)
            .with_create_dirs(false);
        assert_eq!(config.output_dir, PathBuf::from("/downloads"));
        assert!(config.overwrite);
        assert!(!config.create_dirs);
    }
}
