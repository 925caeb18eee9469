//! Plain-text export rendering.
//!
//! ```text
//! ListAll Export
//! ==================================================
//! Exported: 2024-05-01 09:30 UTC
//!
//! Groceries
//! --------------------------------------------------
//! 1. [ ] Milk (×2)
//!    Whole milk
//! 2. [✓] Bread
//! ```

use std::fmt::Write;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::ListRecord;

/// First line of every plain-text export.
const TEXT_TITLE: &str = "ListAll Export";

/// Prefix of every description line under an item.
pub const DESCRIPTION_INDENT: &str = "   ";

/// A title that already ends like `(x12)` would be read back as a quantity.
static QUANTITY_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\((?:×|x|X)\s*\d+\)$")
        .unwrap_or_else(|e| panic!("Invalid quantity suffix regex: {e}"))
});

const RULE_WIDTH: usize = 50;

/// Render lists as a plain-text checklist.
#[must_use]
pub fn render_text(lists: &[ListRecord], exported_at: Option<DateTime<Utc>>) -> String {
    let mut out = String::new();
    out.push_str(TEXT_TITLE);
    out.push('\n');
    out.push_str(&"=".repeat(RULE_WIDTH));
    out.push('\n');
    if let Some(when) = exported_at {
        let _ = writeln!(out, "Exported: {}", when.format("%Y-%m-%d %H:%M UTC"));
    }

    for list in lists {
        out.push('\n');
        out.push_str(&list.name);
        out.push('\n');
        out.push_str(&"-".repeat(RULE_WIDTH));
        out.push('\n');

        if list.items.is_empty() {
            out.push_str("(no items)\n");
            continue;
        }

        for (index, item) in list.items.iter().enumerate() {
            let mark = if item.is_crossed_out.unwrap_or(false) { "✓" } else { " " };
            let _ = write!(out, "{}. [{mark}] {}", index + 1, item.title);
            let quantity = item.quantity.unwrap_or(1);
            if quantity > 1 || QUANTITY_SUFFIX.is_match(item.title.trim_end()) {
                let _ = write!(out, " (×{quantity})");
            }
            out.push('\n');

            if let Some(description) = item.description.as_deref().filter(|d| !d.is_empty()) {
                for line in description.lines() {
                    let _ = writeln!(out, "{DESCRIPTION_INDENT}{line}");
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemRecord;
    use chrono::TimeZone;

    fn groceries() -> ListRecord {
        let mut list = ListRecord::named("Groceries");
        list.items.push(ItemRecord {
            quantity: Some(2),
            description: Some("Whole milk\nCold aisle".to_string()),
            is_crossed_out: Some(false),
            ..ItemRecord::titled("Milk")
        });
        list.items.push(ItemRecord {
            quantity: Some(1),
            is_crossed_out: Some(true),
            ..ItemRecord::titled("Bread")
        });
        list
    }

    #[test]
    fn test_render_text_layout() {
        let when = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let text = render_text(&[groceries()], Some(when));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "ListAll Export");
        assert_eq!(lines[2], "Exported: 2024-05-01 09:30 UTC");
        assert_eq!(lines[4], "Groceries");
        assert_eq!(lines[6], "1. [ ] Milk (×2)");
        assert_eq!(lines[7], "   Whole milk");
        assert_eq!(lines[8], "   Cold aisle");
        assert_eq!(lines[9], "2. [✓] Bread");
    }

    #[test]
    fn test_render_text_keeps_quantity_like_titles() {
        let mut list = ListRecord::named("Groceries");
        list.items.push(ItemRecord {
            quantity: Some(1),
            ..ItemRecord::titled("Eggs (x12)")
        });
        let text = render_text(&[list], None);
        assert!(text.contains("1. [ ] Eggs (x12) (×1)\n"), "{text}");
    }

    #[test]
    fn test_render_text_empty_list() {
        let text = render_text(&[ListRecord::named("Empty")], None);
        assert!(text.contains("Empty\n"));
        assert!(text.contains("(no items)"));
        assert!(!text.contains("Exported:"));
    }
}
