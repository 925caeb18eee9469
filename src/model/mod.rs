//! Data records for lists, items, images and user preferences.
//!
//! [`records`] holds the portable shapes that exports write and imports
//! read; they mirror the stored types with optional identity and timestamps.

mod base64_bytes;
pub mod records;
mod types;

pub use records::{ExportDocument, ImageRecord, ItemRecord, ListRecord, EXPORT_VERSION};
pub use types::*;
