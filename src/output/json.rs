//! JSON output formatting for listall.

use serde::Serialize;
use serde_json::json;

use crate::error::ListAllError;
use crate::features::export::ExportSummary;
use crate::features::import::ImportResult;
use crate::model::{Item, ItemImage, List, UserData};

/// Format lists as JSON
///
/// # Errors
///
/// Returns `ListAllError::Parse` if JSON serialization fails.
pub fn format_lists_json(lists: &[List]) -> Result<String, ListAllError> {
    let items: Vec<_> = lists
        .iter()
        .map(|list| {
            json!({
                "id": list.id,
                "name": list.name,
                "orderNumber": list.order_number,
                "isArchived": list.is_archived,
                "itemCount": list.items.len(),
                "activeCount": list.active_count(),
                "createdAt": list.created_at,
                "modifiedAt": list.modified_at,
            })
        })
        .collect();

    let output = json!({
        "count": lists.len(),
        "items": items
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format a list with its items as JSON
///
/// # Errors
///
/// Returns `ListAllError::Parse` if JSON serialization fails.
pub fn format_list_json(list: &List) -> Result<String, ListAllError> {
    Ok(serde_json::to_string_pretty(list)?)
}

/// Format a single item as JSON
///
/// # Errors
///
/// Returns `ListAllError::Parse` if JSON serialization fails.
pub fn format_item_json(item: &Item) -> Result<String, ListAllError> {
    Ok(serde_json::to_string_pretty(item)?)
}

/// Format image metadata as JSON. Payloads are left out.
///
/// # Errors
///
/// Returns `ListAllError::Parse` if JSON serialization fails.
pub fn format_images_json(item: &Item, images: &[ItemImage]) -> Result<String, ListAllError> {
    let items: Vec<_> = images
        .iter()
        .map(|image| {
            json!({
                "id": image.id,
                "orderNumber": image.order_number,
                "bytes": image.size(),
                "createdAt": image.created_at,
            })
        })
        .collect();

    let output = json!({
        "itemId": item.id,
        "count": images.len(),
        "items": items
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format an import result as JSON
///
/// # Errors
///
/// Returns `ListAllError::Parse` if JSON serialization fails.
pub fn format_import_result_json(result: &ImportResult) -> Result<String, ListAllError> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Format an export summary as JSON
///
/// # Errors
///
/// Returns `ListAllError::Parse` if JSON serialization fails.
pub fn format_export_summary_json(summary: &ExportSummary) -> Result<String, ListAllError> {
    Ok(serde_json::to_string_pretty(summary)?)
}

/// Format user preferences as JSON
///
/// # Errors
///
/// Returns `ListAllError::Parse` if JSON serialization fails.
pub fn format_prefs_json(prefs: &UserData) -> Result<String, ListAllError> {
    Ok(serde_json::to_string_pretty(prefs)?)
}

/// Generic JSON formatter for any serializable type
///
/// # Errors
///
/// Returns `ListAllError::Parse` if JSON serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, ListAllError> {
    Ok(serde_json::to_string_pretty(value)?)
}
