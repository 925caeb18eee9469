//! JSON export rendering.

use crate::error::ListAllError;
use crate::model::{ExportDocument, ListRecord};

/// Render lists as a pretty-printed, versioned export document.
///
/// # Errors
///
/// Returns `ListAllError::Parse` if serialization fails.
pub fn render_json(lists: Vec<ListRecord>) -> Result<String, ListAllError> {
    let document = ExportDocument::new(lists);
    Ok(serde_json::to_string_pretty(&document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemRecord;

    #[test]
    fn test_render_json_document() {
        let mut list = ListRecord::named("Groceries");
        list.items.push(ItemRecord::titled("Milk"));

        let json = render_json(vec![list]).unwrap();

        assert!(json.contains("\"version\": 1"));
        assert!(json.contains("\"name\": \"Groceries\""));
        assert!(json.contains("\"title\": \"Milk\""));
        // Absent optional fields are omitted entirely.
        assert!(!json.contains("description"));
    }

    #[test]
    fn test_render_json_parses_back() {
        let json = render_json(vec![ListRecord::named("A"), ListRecord::named("B")]).unwrap();
        let doc: ExportDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(doc.lists.len(), 2);
        assert_eq!(doc.lists[1].name, "B");
    }
}
