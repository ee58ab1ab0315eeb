//! Category → formats and format → content type tables.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::types::Category;

/// Content type returned for format identifiers the catalog does not know.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

struct FormatEntry {
    id: &'static str,
    category: Category,
    mime_type: &'static str,
}

// Order within a category is the order formats are offered to the user.
#[rustfmt::skip]
const FORMATS: &[FormatEntry] = &[
    FormatEntry { id: "mp3", category: Category::Audio, mime_type: "audio/mpeg" },
    FormatEntry { id: "wav", category: Category::Audio, mime_type: "audio/wav" },
    FormatEntry { id: "ogg", category: Category::Audio, mime_type: "audio/ogg" },
    FormatEntry { id: "aac", category: Category::Audio, mime_type: "audio/aac" },
    FormatEntry { id: "m4a", category: Category::Audio, mime_type: "audio/mp4" },
    FormatEntry { id: "flac", category: Category::Audio, mime_type: "audio/flac" },
    FormatEntry { id: "mp4", category: Category::Video, mime_type: "video/mp4" },
    FormatEntry { id: "webm", category: Category::Video, mime_type: "video/webm" },
    FormatEntry { id: "avi", category: Category::Video, mime_type: "video/x-msvideo" },
    FormatEntry { id: "mov", category: Category::Video, mime_type: "video/quicktime" },
    FormatEntry { id: "mkv", category: Category::Video, mime_type: "video/x-matroska" },
];

static STANDARD: Lazy<FormatCatalog> = Lazy::new(FormatCatalog::build);

/// Immutable lookup of selectable formats and their content types.
#[derive(Debug)]
pub struct FormatCatalog {
    by_category: HashMap<Category, Vec<&'static str>>,
    entries: HashMap<&'static str, (Category, &'static str)>,
}

impl FormatCatalog {
    /// Returns the process-wide catalog.
    pub fn standard() -> &'static FormatCatalog {
        &STANDARD
    }

    fn build() -> Self {
        let mut by_category: HashMap<Category, Vec<&'static str>> = Category::ALL
            .iter()
            .map(|category| (*category, Vec::new()))
            .collect();
        let mut entries = HashMap::with_capacity(FORMATS.len());

        for entry in FORMATS {
            by_category.entry(entry.category).or_default().push(entry.id);
            entries.insert(entry.id, (entry.category, entry.mime_type));
        }

        Self {
            by_category,
            entries,
        }
    }

    /// Returns the ordered formats selectable for a category.
    pub fn formats_for(&self, category: Category) -> &[&'static str] {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns the content type for a format, or [`FALLBACK_MIME_TYPE`].
    pub fn mime_type_for(&self, format: &str) -> &'static str {
        self.entries
            .get(format)
            .map(|(_, mime)| *mime)
            .unwrap_or(FALLBACK_MIME_TYPE)
    }

    /// Whether `format` is selectable within `category`.
    pub fn contains(&self, category: Category, format: &str) -> bool {
        self.category_of(format) == Some(category)
    }

    /// Returns the category a format belongs to.
    pub fn category_of(&self, format: &str) -> Option<Category> {
        self.entries.get(format).map(|(category, _)| *category)
    }
}

/// Shorthand for [`FormatCatalog::formats_for`] on the standard catalog.
pub fn formats_for(category: Category) -> &'static [&'static str] {
    STANDARD.formats_for(category)
}

/// Shorthand for [`FormatCatalog::mime_type_for`] on the standard catalog.
pub fn mime_type_for(format: &str) -> &'static str {
    STANDARD.mime_type_for(format)
}
