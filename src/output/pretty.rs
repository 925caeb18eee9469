use colored::Colorize;
use uuid::Uuid;

use crate::features::export::ExportSummary;
use crate::features::import::ImportResult;
use crate::model::{Item, ItemImage, List, UserData};

/// First eight characters of an id; enough for `resolve_*` lookups.
pub fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

fn checkbox(item: &Item) -> colored::ColoredString {
    if item.is_crossed_out {
        "[✓]".green()
    } else {
        "[ ]".white()
    }
}

fn item_line(position: usize, item: &Item) -> String {
    let title = if item.is_crossed_out {
        item.title.strikethrough().dimmed().to_string()
    } else {
        item.title.bold().to_string()
    };

    let mut line = format!("{:>3}. {} {}", position, checkbox(item), title);
    if item.quantity > 1 {
        line.push_str(&format!(" {}", format!("×{}", item.quantity).yellow()));
    }
    if !item.images.is_empty() {
        line.push_str(&format!(" {}", format!("[{} img]", item.images.len()).cyan()));
    }
    line.push_str(&format!("  {}", short_id(item.id).dimmed()));
    line
}

/// Format lists as an overview
pub fn format_lists_pretty(lists: &[List]) -> String {
    if lists.is_empty() {
        return "Lists (0)\n  No lists".to_string();
    }

    let mut output = format!("Lists ({})\n", lists.len());
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for list in lists {
        let mut line = format!("  {}", list.name.bold());
        line.push_str(&format!(
            "  {} open, {} done",
            list.active_count(),
            list.crossed_out_count()
        ));
        if list.is_archived {
            line.push_str(&format!("  {}", "archived".yellow()));
        }
        line.push_str(&format!("  {}", short_id(list.id).dimmed()));
        output.push_str(&line);
        output.push('\n');
    }

    output
}

/// Format a list with its items
pub fn format_list_pretty(list: &List) -> String {
    let mut output = format!("{}", list.name.bold());
    if list.is_archived {
        output.push_str(&format!("  {}", "archived".yellow()));
    }
    output.push_str(&format!(
        "  {}\n",
        format!("{} items", list.items.len()).dimmed()
    ));
    output.push_str(&"─".repeat(60));
    output.push('\n');

    if list.items.is_empty() {
        output.push_str("  No items\n");
        return output;
    }

    for (index, item) in list.items.iter().enumerate() {
        output.push_str(&item_line(index + 1, item));
        output.push('\n');
        for line in item.description.lines() {
            output.push_str(&format!("       {}\n", line.dimmed()));
        }
    }

    output
}

/// Format a single item with all its fields
pub fn format_item_pretty(item: &Item) -> String {
    let mut output = format!("{} {}\n", checkbox(item), item.title.bold());
    output.push_str(&format!("  {}: {}\n", "ID".dimmed(), item.id));
    output.push_str(&format!("  {}: {}\n", "List".dimmed(), item.list_id));
    output.push_str(&format!("  {}: {}\n", "Quantity".dimmed(), item.quantity));
    output.push_str(&format!("  {}: {}\n", "Position".dimmed(), item.order_number + 1));

    if !item.description.is_empty() {
        output.push_str(&format!("  {}: {}\n", "Description".dimmed(), item.description));
    }
    if !item.images.is_empty() {
        output.push_str(&format!("  {}: {}\n", "Images".dimmed(), item.images.len()));
    }

    output.push_str(&format!(
        "  {}: {}\n",
        "Created".dimmed(),
        item.created_at.format("%Y-%m-%d %H:%M")
    ));
    output.push_str(&format!(
        "  {}: {}\n",
        "Modified".dimmed(),
        item.modified_at.format("%Y-%m-%d %H:%M")
    ));

    output
}

/// Format the images attached to an item
pub fn format_images_pretty(item: &Item, images: &[ItemImage]) -> String {
    if images.is_empty() {
        return format!("Images for {} (0)\n  No images", item.title);
    }

    let mut output = format!("Images for {} ({})\n", item.title.bold(), images.len());
    output.push_str(&"─".repeat(40));
    output.push('\n');

    for (index, image) in images.iter().enumerate() {
        output.push_str(&format!(
            "{:>3}. {}  {}  {}\n",
            index + 1,
            short_id(image.id),
            format_bytes(image.size()).yellow(),
            image.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
        ));
    }

    output
}

/// Format the outcome of an import
pub fn format_import_result_pretty(result: &ImportResult) -> String {
    let heading = if result.dry_run {
        format!("Import preview ({})", result.strategy)
    } else {
        format!("Imported ({})", result.strategy)
    };

    let mut output = format!("{}\n", heading.bold());
    output.push_str(&format!(
        "  {}: {} created, {} updated, {} unchanged",
        "Lists".dimmed(),
        result.lists_created.to_string().green(),
        result.lists_updated.to_string().yellow(),
        result.lists_unchanged
    ));
    if result.lists_deleted > 0 {
        output.push_str(&format!(", {} deleted", result.lists_deleted.to_string().red()));
    }
    output.push('\n');
    output.push_str(&format!(
        "  {}: {} created, {} updated, {} skipped\n",
        "Items".dimmed(),
        result.items_created.to_string().green(),
        result.items_updated.to_string().yellow(),
        result.items_skipped
    ));
    if result.images_created > 0 {
        output.push_str(&format!(
            "  {}: {} created\n",
            "Images".dimmed(),
            result.images_created.to_string().green()
        ));
    }
    if result.dry_run {
        output.push_str(&format!("  {}\n", "Nothing was written.".dimmed()));
    } else if !result.has_changes() {
        output.push_str(&format!("  {}\n", "Already up to date.".dimmed()));
    }

    output
}

/// Format an export that was written to a file
pub fn format_export_summary_pretty(summary: &ExportSummary) -> String {
    let mut output = format!(
        "{} {} lists, {} items as {}",
        "Exported".green(),
        summary.lists,
        summary.items,
        summary.format.to_string().bold()
    );
    if let Some(path) = &summary.path {
        output.push_str(&format!(" to {}", path.display()));
    }
    output.push_str(&format!(" ({})", format_bytes(summary.bytes)));
    output
}

/// Format user preferences
pub fn format_prefs_pretty(prefs: &UserData) -> String {
    let mut output = format!("{}\n", "Preferences".bold());
    output.push_str(&format!("  {}: {}\n", "User".dimmed(), prefs.user_id));
    output.push_str(&format!(
        "  {}: {}\n",
        "Show crossed-out items".dimmed(),
        prefs.show_crossed_out_items
    ));
    output.push_str(&format!(
        "  {}: {}\n",
        "Default import strategy".dimmed(),
        prefs.default_import_strategy
    ));
    output.push_str(&format!(
        "  {}: {}\n",
        "Default export format".dimmed(),
        prefs.default_export_format
    ));
    let last_sync = prefs.last_sync_date.map_or_else(
        || "never".to_string(),
        |d| d.format("%Y-%m-%d %H:%M").to_string(),
    );
    output.push_str(&format!("  {}: {}\n", "Last sync".dimmed(), last_sync));
    output
}

#[allow(clippy::cast_precision_loss)]
fn format_bytes(bytes: usize) -> String {
    const KIB: usize = 1024;
    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < KIB * KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MiB", bytes as f64 / (KIB * KIB) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExportFormat, ImportStrategy, NewItem};

    fn make_list(name: &str, titles: &[&str]) -> List {
        let mut list = List::new(name, 0);
        list.items = titles
            .iter()
            .enumerate()
            .map(|(i, t)| Item::new(list.id, &NewItem::titled(t), i64::try_from(i).unwrap()))
            .collect();
        list
    }

    #[test]
    fn test_format_lists_pretty_empty() {
        let output = format_lists_pretty(&[]);
        assert!(output.contains("Lists (0)"));
        assert!(output.contains("No lists"));
    }

    #[test]
    fn test_format_lists_pretty_counts() {
        let mut list = make_list("Groceries", &["Milk", "Bread"]);
        list.items[0].is_crossed_out = true;
        let output = format_lists_pretty(&[list]);

        assert!(output.contains("Lists (1)"));
        assert!(output.contains("Groceries"));
        assert!(output.contains("1 open, 1 done"));
    }

    #[test]
    fn test_format_lists_pretty_marks_archived() {
        let mut list = make_list("Old", &[]);
        list.is_archived = true;
        assert!(format_lists_pretty(&[list]).contains("archived"));
    }

    #[test]
    fn test_format_list_pretty_items() {
        colored::control::set_override(false);
        let mut list = make_list("Groceries", &["Milk", "Bread"]);
        list.items[0].quantity = 3;
        list.items[0].description = "Whole\nOrganic".to_string();
        list.items[1].is_crossed_out = true;

        let output = format_list_pretty(&list);

        assert!(output.contains("1. [ ]"));
        assert!(output.contains("×3"));
        assert!(output.contains("Organic"));
        assert!(output.contains("2. [✓]"));
        assert!(output.contains("Bread"));
    }

    #[test]
    fn test_format_list_pretty_empty() {
        let list = make_list("Empty", &[]);
        assert!(format_list_pretty(&list).contains("No items"));
    }

    #[test]
    fn test_format_item_pretty_hides_empty_description() {
        let list = make_list("Groceries", &["Milk"]);
        let output = format_item_pretty(&list.items[0]);

        assert!(output.contains("Milk"));
        assert!(output.contains("Quantity"));
        assert!(!output.contains("Description"));
    }

    #[test]
    fn test_format_images_pretty() {
        let list = make_list("Groceries", &["Milk"]);
        let item = &list.items[0];
        let images = vec![ItemImage::new(item.id, vec![0; 2048], 0)];

        let output = format_images_pretty(item, &images);
        assert!(output.contains("(1)"));
        assert!(output.contains("2.0 KiB"));
    }

    #[test]
    fn test_format_import_result_preview() {
        let mut result = ImportResult::new(ImportStrategy::Merge);
        result.dry_run = true;
        result.lists_updated = 1;

        let output = format_import_result_pretty(&result);
        assert!(output.contains("Import preview (merge)"));
        assert!(output.contains("Nothing was written."));
        assert!(!output.contains("deleted"));
    }

    #[test]
    fn test_format_import_result_without_changes() {
        let mut result = ImportResult::new(ImportStrategy::Merge);
        result.lists_unchanged = 1;
        result.items_skipped = 2;

        let output = format_import_result_pretty(&result);
        assert!(output.contains("Already up to date."));
        assert!(!output.contains("Nothing was written."));

        result.items_updated = 1;
        assert!(!format_import_result_pretty(&result).contains("Already up to date."));
    }

    #[test]
    fn test_format_export_summary() {
        let summary = ExportSummary {
            format: ExportFormat::Csv,
            path: Some("/tmp/out.csv".into()),
            lists: 2,
            items: 5,
            bytes: 300,
        };
        let output = format_export_summary_pretty(&summary);
        assert!(output.contains("2 lists, 5 items"));
        assert!(output.contains("/tmp/out.csv"));
        assert!(output.contains("300 B"));
    }

    #[test]
    fn test_format_prefs_never_synced() {
        let output = format_prefs_pretty(&UserData::default());
        assert!(output.contains("never"));
        assert!(output.contains("merge"));
    }

    #[test]
    fn test_short_id_length() {
        assert_eq!(short_id(Uuid::new_v4()).len(), 8);
    }
}
