//! Export facade: read lists from the store and write them in a chosen format.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{render_csv, render_json, render_text, ExportOptions};
use crate::error::ListAllError;
use crate::model::{ExportFormat, ListRecord};
use crate::storage::Store;

/// What an export produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub format: ExportFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub lists: usize,
    pub items: usize,
    pub bytes: usize,
}

/// Builds exports from a store.
pub struct Exporter<'c> {
    store: Store<'c>,
    options: ExportOptions,
}

impl<'c> Exporter<'c> {
    #[must_use]
    pub const fn new(store: Store<'c>, options: ExportOptions) -> Self {
        Self { store, options }
    }

    /// Lists shaped by the export options.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn records(&self) -> Result<Vec<ListRecord>, ListAllError> {
        let lists = self
            .store
            .lists_with_items(self.options.include_archived_lists, self.options.include_images)?;

        Ok(lists
            .iter()
            .map(|list| self.shape(ListRecord::from(list)))
            .collect())
    }

    fn shape(&self, mut list: ListRecord) -> ListRecord {
        let opts = self.options;

        if !opts.include_crossed_out_items {
            list.items.retain(|item| !item.is_crossed_out.unwrap_or(false));
        }
        if !opts.include_dates {
            list.created_at = None;
            list.modified_at = None;
        }

        for item in &mut list.items {
            if !opts.include_descriptions {
                item.description = None;
            }
            if !opts.include_quantities {
                item.quantity = None;
            }
            if !opts.include_dates {
                item.created_at = None;
                item.modified_at = None;
                for image in &mut item.images {
                    image.created_at = None;
                }
            }
            if !opts.include_images {
                item.images.clear();
            }
        }

        list
    }

    /// Render every list in `format`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or rendering fails.
    pub fn export_to_string(&self, format: ExportFormat) -> Result<String, ListAllError> {
        let records = self.records()?;
        tracing::info!(
            %format,
            lists = records.len(),
            items = records.iter().map(|l| l.items.len()).sum::<usize>(),
            "exporting"
        );

        match format {
            ExportFormat::Json => render_json(records),
            ExportFormat::Csv => render_csv(&records),
            ExportFormat::Text => Ok(render_text(
                &records,
                self.options.include_dates.then(Utc::now),
            )),
        }
    }

    /// Render every list and write it to `path`.
    ///
    /// The file is written to a sibling temporary path first and renamed into
    /// place, so readers never see a partial export.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or any file operation fails.
    pub fn export_to_file(
        &self,
        format: ExportFormat,
        path: &Path,
    ) -> Result<ExportSummary, ListAllError> {
        let records = self.records()?;
        let lists = records.len();
        let items = records.iter().map(|l| l.items.len()).sum();

        let content = match format {
            ExportFormat::Json => render_json(records)?,
            ExportFormat::Csv => render_csv(&records)?,
            ExportFormat::Text => render_text(&records, self.options.include_dates.then(Utc::now)),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ListAllError::Export(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        let tmp = path.with_extension(format!("{}.tmp", format.extension()));
        std::fs::write(&tmp, &content).map_err(|e| {
            ListAllError::Export(format!("Failed to write {}: {e}", tmp.display()))
        })?;
        std::fs::rename(&tmp, path).map_err(|e| {
            ListAllError::Export(format!("Failed to move export into {}: {e}", path.display()))
        })?;

        tracing::info!(%format, path = %path.display(), bytes = content.len(), "export written");
        Ok(ExportSummary {
            format,
            path: Some(path.to_path_buf()),
            lists,
            items,
            bytes: content.len(),
        })
    }
}

/// File name for an export taken at `when`, e.g. `listall-export-20240501-093000.json`.
#[must_use]
pub fn default_file_name(format: ExportFormat, when: DateTime<Utc>) -> String {
    format!(
        "listall-export-{}.{}",
        when.format("%Y%m%d-%H%M%S"),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExportDocument, ItemUpdate, NewItem};
    use crate::storage::Database;
    use chrono::TimeZone;

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        let store = db.store();
        let groceries = store.create_list("Groceries").unwrap();
        let milk = store
            .add_item(
                groceries.id,
                &NewItem {
                    title: "Milk".to_string(),
                    description: "Whole".to_string(),
                    quantity: 2,
                },
            )
            .unwrap();
        let bread = store.add_item(groceries.id, &NewItem::titled("Bread")).unwrap();
        store
            .update_item(
                bread.id,
                &ItemUpdate {
                    is_crossed_out: Some(true),
                    ..ItemUpdate::default()
                },
            )
            .unwrap();
        store.attach_image(milk.id, vec![1, 2, 3]).unwrap();

        let old = store.create_list("Old").unwrap();
        store.set_archived(old.id, true).unwrap();
        db
    }

    #[test]
    fn test_default_options_skip_archived_and_images() {
        let db = seeded();
        let exporter = Exporter::new(db.store(), ExportOptions::default());

        let records = exporter.records().unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].items.len(), 2);
        assert!(records[0].items[0].images.is_empty());
        assert_eq!(records[0].items[0].description.as_deref(), Some("Whole"));
    }

    #[test]
    fn test_options_strip_fields() {
        let db = seeded();
        let options = ExportOptions {
            include_crossed_out_items: false,
            ..ExportOptions::minimal()
        };
        let records = Exporter::new(db.store(), options).records().unwrap();

        let items = &records[0].items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Milk");
        assert!(items[0].description.is_none());
        assert!(items[0].quantity.is_none());
        assert!(items[0].modified_at.is_none());
        assert!(records[0].modified_at.is_none());
    }

    #[test]
    fn test_full_export_includes_images_and_archived() {
        let db = seeded();
        let json = Exporter::new(db.store(), ExportOptions::full())
            .export_to_string(ExportFormat::Json)
            .unwrap();

        let doc: ExportDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(doc.lists.len(), 2);
        assert_eq!(doc.lists[0].items[0].images[0].image_data, vec![1, 2, 3]);
    }

    #[test]
    fn test_export_text_and_csv() {
        let db = seeded();
        let exporter = Exporter::new(db.store(), ExportOptions::default());

        let text = exporter.export_to_string(ExportFormat::Text).unwrap();
        assert!(text.contains("1. [ ] Milk (×2)"));
        assert!(text.contains("2. [✓] Bread"));

        let csv = exporter.export_to_string(ExportFormat::Csv).unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.lines().nth(1).unwrap().starts_with("Groceries,Milk,Whole,2,false,0,"));
    }

    #[test]
    fn test_export_to_file() {
        let db = seeded();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("lists.csv");

        let summary = Exporter::new(db.store(), ExportOptions::default())
            .export_to_file(ExportFormat::Csv, &path)
            .unwrap();

        assert_eq!(summary.lists, 1);
        assert_eq!(summary.items, 2);
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.len(), summary.bytes);
        assert!(!path.with_extension("csv.tmp").exists());
    }

    #[test]
    fn test_default_file_name() {
        let when = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        assert_eq!(
            default_file_name(ExportFormat::Text, when),
            "listall-export-20240501-093000.txt"
        );
    }
}
