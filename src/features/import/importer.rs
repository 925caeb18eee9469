//! Import facade: apply parsed lists to the store with a chosen strategy.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{detect_format, parse};
use crate::core::{resolve_last_write_wins, Resolution};
use crate::error::ListAllError;
use crate::model::{
    ExportFormat, ImageRecord, ImportStrategy, Item, ItemImage, ItemRecord, List, ListRecord,
};
use crate::storage::{Database, Store};

/// Parsed import input, independent of the format it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPayload {
    pub format: ExportFormat,
    pub lists: Vec<ListRecord>,
}

impl ImportPayload {
    /// Parse `content`, auto-detecting the format when none is given.
    ///
    /// # Errors
    ///
    /// Returns `ListAllError::Import` if the content is malformed or empty.
    pub fn parse(content: &str, format: Option<ExportFormat>) -> Result<Self, ListAllError> {
        let format = format.unwrap_or_else(|| detect_format(content));
        let lists = parse(content, format)?;
        tracing::debug!(%format, lists = lists.len(), "parsed import payload");
        Ok(Self { format, lists })
    }

    /// Read and parse a file.
    ///
    /// Without an explicit format the file extension decides, falling back
    /// to content detection.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, larger than `max_bytes`, or
    /// cannot be parsed.
    pub fn from_file(
        path: &Path,
        format: Option<ExportFormat>,
        max_bytes: u64,
    ) -> Result<Self, ListAllError> {
        let meta = std::fs::metadata(path).map_err(|e| {
            ListAllError::Import(format!("Cannot read {}: {e}", path.display()))
        })?;
        if meta.len() > max_bytes {
            return Err(ListAllError::Import(format!(
                "{} is {} bytes, larger than the {max_bytes} byte import limit",
                path.display(),
                meta.len()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            ListAllError::Import(format!("Cannot read {}: {e}", path.display()))
        })?;
        let format = format.or_else(|| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .and_then(ExportFormat::from_extension)
        });
        Self::parse(&content, format)
    }

    /// Total number of items across all lists.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.lists.iter().map(|l| l.items.len()).sum()
    }
}

/// What an import did (or, for a preview, would do).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    /// The strategy that was actually applied.
    pub strategy: ImportStrategy,
    pub dry_run: bool,
    pub lists_created: usize,
    pub lists_updated: usize,
    pub lists_unchanged: usize,
    pub lists_deleted: usize,
    pub items_created: usize,
    pub items_updated: usize,
    pub items_skipped: usize,
    pub images_created: usize,
}

impl ImportResult {
    #[must_use]
    pub const fn new(strategy: ImportStrategy) -> Self {
        Self {
            strategy,
            dry_run: false,
            lists_created: 0,
            lists_updated: 0,
            lists_unchanged: 0,
            lists_deleted: 0,
            items_created: 0,
            items_updated: 0,
            items_skipped: 0,
            images_created: 0,
        }
    }

    /// Whether the import touched anything.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.lists_created
            + self.lists_updated
            + self.lists_deleted
            + self.items_created
            + self.items_updated
            + self.images_created
            > 0
    }
}

/// Applies import payloads to a database.
pub struct Importer<'d> {
    db: &'d Database,
}

impl<'d> Importer<'d> {
    #[must_use]
    pub const fn new(db: &'d Database) -> Self {
        Self { db }
    }

    /// Apply `payload` with `strategy` in a single transaction.
    ///
    /// On success the user's `last_sync_date` is stamped. Any error rolls
    /// back every change.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails.
    pub fn apply(
        &self,
        payload: &ImportPayload,
        strategy: ImportStrategy,
    ) -> Result<ImportResult, ListAllError> {
        let result = self.db.transaction(|store| {
            let result = apply_to_store(store, &payload.lists, strategy)?;

            let mut prefs = store.load_user_data()?;
            prefs.last_sync_date = Some(Utc::now());
            store.save_user_data(&prefs)?;
            Ok(result)
        })?;

        tracing::info!(
            strategy = %result.strategy,
            format = %payload.format,
            items = payload.item_count(),
            lists_created = result.lists_created,
            lists_updated = result.lists_updated,
            items_created = result.items_created,
            items_updated = result.items_updated,
            "import applied"
        );
        Ok(result)
    }

    /// Report what `apply` would do without writing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn preview(
        &self,
        payload: &ImportPayload,
        strategy: ImportStrategy,
    ) -> Result<ImportResult, ListAllError> {
        let mut result = self
            .db
            .dry_run(|store| apply_to_store(store, &payload.lists, strategy))?;
        result.dry_run = true;
        Ok(result)
    }

    /// Parse `content` and apply it.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or applying fails.
    pub fn import_str(
        &self,
        content: &str,
        format: Option<ExportFormat>,
        strategy: ImportStrategy,
    ) -> Result<ImportResult, ListAllError> {
        let payload = ImportPayload::parse(content, format)?;
        self.apply(&payload, strategy)
    }
}

/// Dispatch on the selected strategy.
///
/// # Errors
///
/// Returns an error if any write fails.
pub fn apply_to_store(
    store: &Store<'_>,
    lists: &[ListRecord],
    strategy: ImportStrategy,
) -> Result<ImportResult, ListAllError> {
    let result = match strategy {
        ImportStrategy::Replace => replace(store, lists)?,
        ImportStrategy::Merge => merge(store, lists)?,
        ImportStrategy::Append => append(store, lists)?,
    };
    debug_assert_eq!(result.strategy, strategy);
    Ok(result)
}

fn replace(store: &Store<'_>, lists: &[ListRecord]) -> Result<ImportResult, ListAllError> {
    let mut result = ImportResult::new(ImportStrategy::Replace);
    result.lists_deleted = store.delete_all_lists()?;

    let now = Utc::now();
    for (order, record) in (0_i64..).zip(lists) {
        let id = claim_list_id(store, record.id)?;
        store.insert_list(&list_from_record(record, id, order, now))?;
        result.lists_created += 1;
        insert_items(store, id, &record.items, true, &mut result)?;
    }
    Ok(result)
}

fn append(store: &Store<'_>, lists: &[ListRecord]) -> Result<ImportResult, ListAllError> {
    let mut result = ImportResult::new(ImportStrategy::Append);

    let now = Utc::now();
    let start = store.next_list_order()?;
    for (order, record) in (start..).zip(lists) {
        let mut list = list_from_record(record, Uuid::new_v4(), order, now);
        list.created_at = now;
        list.modified_at = now;
        store.insert_list(&list)?;
        result.lists_created += 1;
        insert_items(store, list.id, &record.items, false, &mut result)?;
    }
    Ok(result)
}

fn merge(store: &Store<'_>, lists: &[ListRecord]) -> Result<ImportResult, ListAllError> {
    let mut result = ImportResult::new(ImportStrategy::Merge);

    for record in lists {
        let by_id = match record.id {
            Some(id) => store.get_list(id)?,
            None => None,
        };
        let existing = match by_id {
            Some(list) => Some(list),
            None => store.find_list_by_name(&record.name)?,
        };

        match existing {
            Some(mut list) => {
                match resolve_last_write_wins(list.modified_at, record.modified_at) {
                    Resolution::TakeIncoming => {
                        list.name = record.name.trim().to_string();
                        if let Some(archived) = record.is_archived {
                            list.is_archived = archived;
                        }
                        list.modified_at = record.modified_at.unwrap_or_else(Utc::now);
                        store.save_list(&list)?;
                        result.lists_updated += 1;
                    }
                    Resolution::KeepExisting => result.lists_unchanged += 1,
                }
                merge_items(store, list.id, &record.items, &mut result)?;
            }
            None => {
                let id = claim_list_id(store, record.id)?;
                let order = store.next_list_order()?;
                store.insert_list(&list_from_record(record, id, order, Utc::now()))?;
                result.lists_created += 1;
                insert_items(store, id, &record.items, true, &mut result)?;
            }
        }
    }
    Ok(result)
}

fn merge_items(
    store: &Store<'_>,
    list_id: Uuid,
    records: &[ItemRecord],
    result: &mut ImportResult,
) -> Result<(), ListAllError> {
    let mut existing = store.items_for_list(list_id)?;

    for record in records {
        let title = record.title.trim();
        if title.is_empty() {
            tracing::warn!(list = %list_id, "skipping imported item without a title");
            result.items_skipped += 1;
            continue;
        }

        let by_id = match record.id {
            Some(id) => store.get_item(id)?,
            None => None,
        };
        let matched = by_id.or_else(|| {
            let wanted = title.to_lowercase();
            existing
                .iter()
                .find(|item| item.title.trim().to_lowercase() == wanted)
                .cloned()
        });

        let Some(mut item) = matched else {
            let item = create_item(store, list_id, record, true, result)?;
            existing.push(item);
            continue;
        };

        match resolve_last_write_wins(item.modified_at, record.modified_at) {
            Resolution::TakeIncoming => {
                if item.list_id != list_id {
                    item = store.move_item_to_list(item.id, list_id)?;
                }
                item.title = title.to_string();
                if let Some(description) = &record.description {
                    item.description = description.trim().to_string();
                }
                if let Some(quantity) = record.quantity {
                    item.quantity = quantity.max(1);
                }
                if let Some(crossed_out) = record.is_crossed_out {
                    item.is_crossed_out = crossed_out;
                }
                item.modified_at = record.modified_at.unwrap_or_else(Utc::now);
                store.save_item(&item)?;
                result.items_updated += 1;

                match existing.iter_mut().find(|i| i.id == item.id) {
                    Some(slot) => *slot = item.clone(),
                    None => existing.push(item.clone()),
                }
            }
            Resolution::KeepExisting => result.items_skipped += 1,
        }

        // An older record matched by id in another list stays there untouched.
        if item.list_id == list_id {
            merge_images(store, item.id, &record.images, result)?;
        }
    }
    Ok(())
}

/// Add incoming images the item does not already have, matched by id or payload.
fn merge_images(
    store: &Store<'_>,
    item_id: Uuid,
    records: &[ImageRecord],
    result: &mut ImportResult,
) -> Result<(), ListAllError> {
    if records.is_empty() {
        return Ok(());
    }

    let current = store.images_for_item(item_id)?;
    let fresh: Vec<ImageRecord> = records
        .iter()
        .filter(|record| {
            !current.iter().any(|image| {
                record.id == Some(image.id) || record.image_data == image.data
            })
        })
        .cloned()
        .collect();

    insert_images(store, item_id, &fresh, true, result)
}

fn insert_items(
    store: &Store<'_>,
    list_id: Uuid,
    records: &[ItemRecord],
    keep_ids: bool,
    result: &mut ImportResult,
) -> Result<(), ListAllError> {
    for record in records {
        if record.title.trim().is_empty() {
            tracing::warn!(list = %list_id, "skipping imported item without a title");
            result.items_skipped += 1;
            continue;
        }
        create_item(store, list_id, record, keep_ids, result)?;
    }
    Ok(())
}

fn create_item(
    store: &Store<'_>,
    list_id: Uuid,
    record: &ItemRecord,
    keep_ids: bool,
    result: &mut ImportResult,
) -> Result<Item, ListAllError> {
    let now = Utc::now();
    let id = if keep_ids {
        claim_item_id(store, record.id)?
    } else {
        Uuid::new_v4()
    };

    let item = Item {
        id,
        list_id,
        title: record.title.trim().to_string(),
        description: record
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        quantity: record.quantity.unwrap_or(1).max(1),
        order_number: store.next_item_order(list_id)?,
        is_crossed_out: record.is_crossed_out.unwrap_or(false),
        created_at: if keep_ids { record.created_at.unwrap_or(now) } else { now },
        modified_at: if keep_ids { record.modified_at.unwrap_or(now) } else { now },
        images: Vec::new(),
    };
    store.insert_item(&item)?;
    result.items_created += 1;

    insert_images(store, id, &record.images, keep_ids, result)?;
    Ok(item)
}

fn insert_images(
    store: &Store<'_>,
    item_id: Uuid,
    records: &[ImageRecord],
    keep_ids: bool,
    result: &mut ImportResult,
) -> Result<(), ListAllError> {
    for record in records {
        if record.image_data.is_empty() {
            tracing::warn!(item = %item_id, "skipping imported image without data");
            continue;
        }

        let id = if keep_ids {
            claim_image_id(store, record.id)?
        } else {
            Uuid::new_v4()
        };
        let image = ItemImage {
            id,
            item_id,
            data: record.image_data.clone(),
            order_number: store.next_image_order(item_id)?,
            created_at: record.created_at.unwrap_or_else(Utc::now),
        };
        store.insert_image(&image)?;
        result.images_created += 1;
    }
    Ok(())
}

fn list_from_record(record: &ListRecord, id: Uuid, order: i64, now: DateTime<Utc>) -> List {
    List {
        id,
        name: record.name.trim().to_string(),
        order_number: order,
        is_archived: record.is_archived.unwrap_or(false),
        created_at: record.created_at.unwrap_or(now),
        modified_at: record.modified_at.unwrap_or(now),
        items: Vec::new(),
    }
}

// An incoming id is kept only while nothing in the store uses it yet.

fn claim_list_id(store: &Store<'_>, wanted: Option<Uuid>) -> Result<Uuid, ListAllError> {
    match wanted {
        Some(id) if store.get_list(id)?.is_none() => Ok(id),
        _ => Ok(Uuid::new_v4()),
    }
}

fn claim_item_id(store: &Store<'_>, wanted: Option<Uuid>) -> Result<Uuid, ListAllError> {
    match wanted {
        Some(id) if store.get_item(id)?.is_none() => Ok(id),
        _ => Ok(Uuid::new_v4()),
    }
}

fn claim_image_id(store: &Store<'_>, wanted: Option<Uuid>) -> Result<Uuid, ListAllError> {
    match wanted {
        Some(id) if store.get_image(id)?.is_none() => Ok(id),
        _ => Ok(Uuid::new_v4()),
    }
}
