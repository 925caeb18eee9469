//! Export of lists to JSON, CSV and plain text.
//!
//! The exporter reads lists through [`crate::storage::Store`], trims them to
//! the chosen [`ExportOptions`] and hands them to a format renderer:
//!
//! - **JSON**: versioned [`crate::model::ExportDocument`], images as base64
//! - **CSV**: one row per item with a fixed header
//! - **Text**: human-readable checklist layout that the importer can read back

mod csv_format;
mod exporter;
mod json_format;
mod options;
mod text_format;

pub use csv_format::{render_csv, CSV_HEADER};
pub use exporter::{default_file_name, ExportSummary, Exporter};
pub use json_format::render_json;
pub use options::ExportOptions;
pub use text_format::{render_text, DESCRIPTION_INDENT};
