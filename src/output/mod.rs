//! Output formatting for listall.
//!
//! Every command renders either colored text for humans or pretty-printed
//! JSON for scripts.

mod json;
mod pretty;

use serde_json::json;

use crate::cli::args::OutputFormat;
use crate::error::ListAllError;
use crate::features::export::ExportSummary;
use crate::features::import::ImportResult;
use crate::model::{Item, ItemImage, List, UserData};

pub use json::*;
pub use pretty::*;

/// Format an overview of lists
///
/// # Errors
///
/// Returns `ListAllError::Parse` if JSON serialization fails.
pub fn format_lists(lists: &[List], format: OutputFormat) -> Result<String, ListAllError> {
    match format {
        OutputFormat::Pretty => Ok(format_lists_pretty(lists)),
        OutputFormat::Json => format_lists_json(lists),
    }
}

/// Format a list with its items
///
/// # Errors
///
/// Returns `ListAllError::Parse` if JSON serialization fails.
pub fn format_list(list: &List, format: OutputFormat) -> Result<String, ListAllError> {
    match format {
        OutputFormat::Pretty => Ok(format_list_pretty(list)),
        OutputFormat::Json => format_list_json(list),
    }
}

/// Format a single item
///
/// # Errors
///
/// Returns `ListAllError::Parse` if JSON serialization fails.
pub fn format_item(item: &Item, format: OutputFormat) -> Result<String, ListAllError> {
    match format {
        OutputFormat::Pretty => Ok(format_item_pretty(item)),
        OutputFormat::Json => format_item_json(item),
    }
}

/// Format the images of an item
///
/// # Errors
///
/// Returns `ListAllError::Parse` if JSON serialization fails.
pub fn format_images(
    item: &Item,
    images: &[ItemImage],
    format: OutputFormat,
) -> Result<String, ListAllError> {
    match format {
        OutputFormat::Pretty => Ok(format_images_pretty(item, images)),
        OutputFormat::Json => format_images_json(item, images),
    }
}

/// Format an import result
///
/// # Errors
///
/// Returns `ListAllError::Parse` if JSON serialization fails.
pub fn format_import_result(
    result: &ImportResult,
    format: OutputFormat,
) -> Result<String, ListAllError> {
    match format {
        OutputFormat::Pretty => Ok(format_import_result_pretty(result)),
        OutputFormat::Json => format_import_result_json(result),
    }
}

/// Format an export summary
///
/// # Errors
///
/// Returns `ListAllError::Parse` if JSON serialization fails.
pub fn format_export_summary(
    summary: &ExportSummary,
    format: OutputFormat,
) -> Result<String, ListAllError> {
    match format {
        OutputFormat::Pretty => Ok(format_export_summary_pretty(summary)),
        OutputFormat::Json => format_export_summary_json(summary),
    }
}

/// Format user preferences
///
/// # Errors
///
/// Returns `ListAllError::Parse` if JSON serialization fails.
pub fn format_prefs(prefs: &UserData, format: OutputFormat) -> Result<String, ListAllError> {
    match format {
        OutputFormat::Pretty => Ok(format_prefs_pretty(prefs)),
        OutputFormat::Json => format_prefs_json(prefs),
    }
}

/// Format a one-line confirmation such as "Deleted list: Groceries"
///
/// # Errors
///
/// Returns `ListAllError::Parse` if JSON serialization fails.
pub fn format_message(message: &str, format: OutputFormat) -> Result<String, ListAllError> {
    match format {
        OutputFormat::Pretty => Ok(message.to_string()),
        OutputFormat::Json => to_json(&json!({ "message": message })),
    }
}
