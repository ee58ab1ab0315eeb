//! Static format catalog.
//!
//! Maps a media [`Category`] to the ordered list of target formats a user may
//! pick, and a format identifier to the content type used for the converted
//! artifact. The tables are built once and shared read-only.
//!
//! # Example
//!
//! ```
//! use mediaconv_core::formats::{formats_for, mime_type_for, Category};
//!
//! assert_eq!(formats_for(Category::Audio)[0], "mp3");
//! assert_eq!(mime_type_for("mkv"), "video/x-matroska");
//! assert_eq!(mime_type_for("xyz"), "application/octet-stream");
//! ```

mod catalog;
mod types;

pub use catalog::{formats_for, mime_type_for, FormatCatalog, FALLBACK_MIME_TYPE};
pub use types::{Category, ParseCategoryError};
