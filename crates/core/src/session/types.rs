//! Source file and artifact types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::formats::Category;

/// Stem used when a source name has nothing left after stripping its extension.
const FALLBACK_STEM: &str = "converted";

/// The user-supplied input file.
///
/// Content is held behind an `Arc` so a transcoder can read it while the
/// session keeps ownership; nobody can mutate it.
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: String,
    size: u64,
    content: Arc<[u8]>,
    category_hint: Option<Category>,
}

impl SourceFile {
    /// Creates a source file; the size is taken from the content length.
    pub fn new(name: impl Into<String>, content: impl Into<Arc<[u8]>>) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            size: content.len() as u64,
            content,
            category_hint: None,
        }
    }

    /// Creates a source file with a size reported by the file picker.
    pub fn from_parts(name: impl Into<String>, size: u64, content: impl Into<Arc<[u8]>>) -> Self {
        Self {
            size,
            ..Self::new(name, content)
        }
    }

    /// Reads a file from disk, inferring the category hint from its extension.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let hint = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Category::from_extension);

        let mut file = Self::new(name, content);
        file.category_hint = hint;
        Ok(file)
    }

    /// Attaches the category the calling context believes this file has.
    pub fn with_category_hint(mut self, category: Category) -> Self {
        self.category_hint = Some(category);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn content(&self) -> &Arc<[u8]> {
        &self.content
    }

    pub fn category_hint(&self) -> Option<Category> {
        self.category_hint
    }

    pub(crate) fn info(&self) -> SourceFileInfo {
        SourceFileInfo {
            name: self.name.clone(),
            size_bytes: self.size,
            category_hint: self.category_hint,
        }
    }
}

/// Derives the download name: source basename plus `.<format>`.
///
/// Only the last extension is stripped (`a.tar.gz` -> `a.tar.mp3`), a name
/// without one is kept whole and a leading dot does not start an extension.
pub fn output_filename(source_name: &str, format: &str) -> String {
    let base = Path::new(source_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(source_name);

    let stem = match base.rfind('.') {
        Some(0) | None => base,
        Some(idx) => &base[..idx],
    };
    let stem = if stem.is_empty() { FALLBACK_STEM } else { stem };

    format!("{}.{}", stem, format)
}

/// The converted file: bytes plus derived name and content type.
#[derive(Debug, Clone)]
pub struct Artifact {
    bytes: Arc<[u8]>,
    filename: String,
    mime_type: String,
    format: String,
    created_at: DateTime<Utc>,
}

impl Artifact {
    pub(crate) fn new(
        bytes: Arc<[u8]>,
        filename: String,
        mime_type: impl Into<String>,
        format: String,
    ) -> Self {
        Self {
            bytes,
            filename,
            mime_type: mime_type.into(),
            format,
            created_at: Utc::now(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Returns the metadata of this artifact without its bytes.
    pub fn info(&self) -> ArtifactInfo {
        ArtifactInfo {
            filename: self.filename.clone(),
            mime_type: self.mime_type.clone(),
            format: self.format.clone(),
            size_bytes: self.size_bytes(),
        }
    }
}

/// Source file metadata exposed to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFileInfo {
    pub name: String,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_hint: Option<Category>,
}

/// Artifact metadata exposed to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactInfo {
    pub filename: String,
    pub mime_type: String,
    pub format: String,
    pub size_bytes: u64,
}
