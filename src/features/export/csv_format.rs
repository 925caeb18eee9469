//! CSV export rendering.
//!
//! One row per item. A list without items still gets one row with an empty
//! item title so that it survives a round trip.

use chrono::{DateTime, Utc};

use crate::error::ListAllError;
use crate::model::ListRecord;

/// Column header written by the exporter and expected by the importer.
pub const CSV_HEADER: [&str; 8] = [
    "List Name",
    "Item Title",
    "Description",
    "Quantity",
    "Crossed Out",
    "Order",
    "Created",
    "Modified",
];

/// Render lists as CSV.
///
/// # Errors
///
/// Returns `ListAllError::Export` if the CSV writer fails.
pub fn render_csv(lists: &[ListRecord]) -> Result<String, ListAllError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(csv_error)?;

    for list in lists {
        if list.items.is_empty() {
            writer
                .write_record([list.name.as_str(), "", "", "", "", "", "", ""])
                .map_err(csv_error)?;
            continue;
        }

        for item in &list.items {
            let row = [
                list.name.clone(),
                item.title.clone(),
                item.description.clone().unwrap_or_default(),
                item.quantity.map(|q| q.to_string()).unwrap_or_default(),
                item.is_crossed_out
                    .map(|done| if done { "true" } else { "false" }.to_string())
                    .unwrap_or_default(),
                item.order_number.map(|o| o.to_string()).unwrap_or_default(),
                timestamp(item.created_at),
                timestamp(item.modified_at),
            ];
            writer.write_record(&row).map_err(csv_error)?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ListAllError::Export(format!("Failed to finish CSV: {e}")))?;
    String::from_utf8(bytes).map_err(|e| ListAllError::Export(format!("CSV is not UTF-8: {e}")))
}

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value.map(|t| t.to_rfc3339()).unwrap_or_default()
}

fn csv_error(err: csv::Error) -> ListAllError {
    ListAllError::Export(format!("Failed to write CSV: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemRecord;

    #[test]
    fn test_render_csv_rows() {
        let mut list = ListRecord::named("Groceries");
        list.items.push(ItemRecord {
            description: Some("whole, organic".to_string()),
            quantity: Some(2),
            is_crossed_out: Some(true),
            order_number: Some(0),
            ..ItemRecord::titled("Milk")
        });

        let csv = render_csv(&[list]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "List Name,Item Title,Description,Quantity,Crossed Out,Order,Created,Modified"
        );
        assert_eq!(lines[1], "Groceries,Milk,\"whole, organic\",2,true,0,,");
    }

    #[test]
    fn test_empty_list_keeps_a_row() {
        let csv = render_csv(&[ListRecord::named("Empty")]).unwrap();
        assert_eq!(csv.lines().nth(1), Some("Empty,,,,,,,"));
    }
}
