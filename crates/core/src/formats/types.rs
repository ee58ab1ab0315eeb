//! Media category type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::catalog::FormatCatalog;

/// Top-level media kind governing which formats and file filters apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Audio,
    Video,
}

/// Error returned when parsing an unknown category name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown media category: {0}")]
pub struct ParseCategoryError(pub String);

impl Category {
    /// All categories, in the order they are offered to the user.
    pub const ALL: [Category; 2] = [Category::Audio, Category::Video];

    /// Returns the lowercase identifier of this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Audio => "audio",
            Category::Video => "video",
        }
    }

    /// Returns the advisory file-picker filter for this category.
    pub fn accept_filter(&self) -> &'static str {
        match self {
            Category::Audio => "audio/*",
            Category::Video => "video/*",
        }
    }

    /// Whether a MIME type belongs to this category (`audio/flac` is audio).
    ///
    /// Advisory only: the workflow never rejects a file based on this.
    pub fn matches_mime(&self, mime: &str) -> bool {
        mime.split('/')
            .next()
            .map(|top| top.trim().eq_ignore_ascii_case(self.as_str()))
            .unwrap_or(false)
    }

    /// Infers a category from a file extension known to the standard catalog.
    pub fn from_extension(extension: &str) -> Option<Category> {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        FormatCatalog::standard().category_of(&ext)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "audio" => Ok(Category::Audio),
            "video" => Ok(Category::Video),
            _ => Err(ParseCategoryError(s.to_string())),
        }
    }
}
