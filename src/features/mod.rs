//! Feature implementations for listall.
//!
//! - Export to JSON, CSV and plain text
//! - Import with replace, merge and append strategies
//! - Image compression and thumbnails
//! - Shell completions

pub mod completions;
pub mod export;
pub mod images;
pub mod import;
