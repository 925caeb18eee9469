//! Data-access facade over the `SQLite` tables.
//!
//! A [`Store`] borrows either a plain connection or an open transaction, so
//! the same operations serve single-shot CLI commands and multi-step imports.
//! Operations that touch several rows (deletes that re-pack order numbers,
//! moves) should run through [`super::Database::transaction`].

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::core::{move_to_position, normalize_order, Ordered};
use crate::error::ListAllError;
use crate::model::{ExportFormat, ImportStrategy, Item, ItemImage, ItemUpdate, List, NewItem, UserData};

const LIST_COLUMNS: &str = "id, name, order_number, is_archived, created_at, modified_at";
const ITEM_COLUMNS: &str =
    "id, list_id, title, description, quantity, order_number, is_crossed_out, created_at, modified_at";
const IMAGE_COLUMNS: &str = "id, item_id, data, order_number, created_at";

/// Which ordered collection an operation works on.
#[derive(Debug, Clone, Copy)]
enum Scope {
    Lists,
    Items(Uuid),
    Images(Uuid),
}

impl Scope {
    const fn table(self) -> &'static str {
        match self {
            Self::Lists => "lists",
            Self::Items(_) => "items",
            Self::Images(_) => "item_images",
        }
    }

    const fn owner_column(self) -> Option<&'static str> {
        match self {
            Self::Lists => None,
            Self::Items(_) => Some("list_id"),
            Self::Images(_) => Some("item_id"),
        }
    }

    const fn owner(self) -> Option<Uuid> {
        match self {
            Self::Lists => None,
            Self::Items(owner) | Self::Images(owner) => Some(owner),
        }
    }
}

/// Position of one row inside its scope.
#[derive(Debug, Clone)]
struct OrderRow {
    id: Uuid,
    order: i64,
}

impl Ordered for OrderRow {
    fn order_number(&self) -> i64 {
        self.order
    }

    fn set_order_number(&mut self, order: i64) {
        self.order = order;
    }
}

/// Lists, items, images and preferences on top of one connection.
#[derive(Clone, Copy)]
pub struct Store<'c> {
    conn: &'c Connection,
}

impl<'c> Store<'c> {
    /// Wrap a connection (or a transaction, via deref).
    #[must_use]
    pub const fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    // ------------------------------------------------------------------
    // Lists
    // ------------------------------------------------------------------

    /// Create a list at the end of the display order.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the insert fails.
    pub fn create_list(&self, name: &str) -> Result<List, ListAllError> {
        let name = clean_text(name, "List name")?;
        let list = List::new(&name, self.next_order(Scope::Lists)?);
        self.insert_list(&list)?;
        tracing::debug!(id = %list.id, name = %list.name, "created list");
        Ok(list)
    }

    /// Insert a fully-formed list, keeping its id and timestamps.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (e.g. the id already exists).
    pub fn insert_list(&self, list: &List) -> Result<(), ListAllError> {
        self.conn
            .execute(
                "INSERT INTO lists (id, name, order_number, is_archived, created_at, modified_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    list.id.to_string(),
                    list.name,
                    list.order_number,
                    list.is_archived,
                    list.created_at.to_rfc3339(),
                    list.modified_at.to_rfc3339(),
                ],
            )
            .map_err(|e| ListAllError::db("Failed to insert list", &e))?;
        Ok(())
    }

    /// Persist every column of an existing list.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the list does not exist.
    pub fn save_list(&self, list: &List) -> Result<(), ListAllError> {
        let changed = self
            .conn
            .execute(
                "UPDATE lists SET name = ?1, order_number = ?2, is_archived = ?3, modified_at = ?4
                 WHERE id = ?5",
                params![
                    list.name,
                    list.order_number,
                    list.is_archived,
                    list.modified_at.to_rfc3339(),
                    list.id.to_string(),
                ],
            )
            .map_err(|e| ListAllError::db("Failed to update list", &e))?;

        if changed == 0 {
            return Err(ListAllError::NotFound(format!("List {}", list.id)));
        }
        Ok(())
    }

    /// Fetch a list by id (without items).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_list(&self, id: Uuid) -> Result<Option<List>, ListAllError> {
        self.conn
            .query_row(
                &format!("SELECT {LIST_COLUMNS} FROM lists WHERE id = ?1"),
                [id.to_string()],
                row_to_list,
            )
            .optional()
            .map_err(|e| ListAllError::db("Failed to query list", &e))
    }

    /// Find the first list (in display order) whose name matches, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_list_by_name(&self, name: &str) -> Result<Option<List>, ListAllError> {
        let wanted = name.trim().to_lowercase();
        Ok(self
            .all_lists(true)?
            .into_iter()
            .find(|list| list.name.trim().to_lowercase() == wanted))
    }

    /// Resolve a user-supplied reference: full id, list name, or unique id prefix.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if nothing matches, `InvalidInput` if a prefix is ambiguous.
    pub fn resolve_list(&self, token: &str) -> Result<List, ListAllError> {
        if let Ok(id) = Uuid::parse_str(token.trim()) {
            if let Some(list) = self.get_list(id)? {
                return Ok(list);
            }
        }
        if let Some(list) = self.find_list_by_name(token)? {
            return Ok(list);
        }
        let id = self.resolve_prefix(Scope::Lists, token, "List")?;
        self.get_list(id)?
            .ok_or_else(|| ListAllError::NotFound(format!("List '{token}'")))
    }

    /// All lists in display order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn all_lists(&self, include_archived: bool) -> Result<Vec<List>, ListAllError> {
        let sql = if include_archived {
            format!("SELECT {LIST_COLUMNS} FROM lists ORDER BY order_number, created_at")
        } else {
            format!(
                "SELECT {LIST_COLUMNS} FROM lists WHERE is_archived = 0 ORDER BY order_number, created_at"
            )
        };

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| ListAllError::db("Failed to prepare query", &e))?;
        let rows = stmt
            .query_map([], row_to_list)
            .map_err(|e| ListAllError::db("Failed to query lists", &e))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| ListAllError::db("Failed to read list row", &e))
    }

    /// Rename a list.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the list does not exist.
    pub fn rename_list(&self, id: Uuid, name: &str) -> Result<List, ListAllError> {
        let name = clean_text(name, "List name")?;
        let mut list = self.require_list(id)?;
        list.name = name;
        list.modified_at = Utc::now();
        self.save_list(&list)?;
        Ok(list)
    }

    /// Archive or restore a list.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the list does not exist.
    pub fn set_archived(&self, id: Uuid, archived: bool) -> Result<List, ListAllError> {
        let mut list = self.require_list(id)?;
        list.is_archived = archived;
        list.modified_at = Utc::now();
        self.save_list(&list)?;
        Ok(list)
    }

    /// Delete a list with its items and images, then close the order gap.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the list does not exist.
    pub fn delete_list(&self, id: Uuid) -> Result<(), ListAllError> {
        let changed = self
            .conn
            .execute("DELETE FROM lists WHERE id = ?1", [id.to_string()])
            .map_err(|e| ListAllError::db("Failed to delete list", &e))?;
        if changed == 0 {
            return Err(ListAllError::NotFound(format!("List {id}")));
        }
        tracing::debug!(%id, "deleted list");
        self.repack(Scope::Lists)
    }

    /// Delete every list. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_all_lists(&self) -> Result<usize, ListAllError> {
        self.conn
            .execute("DELETE FROM lists", [])
            .map_err(|e| ListAllError::db("Failed to delete lists", &e))
    }

    /// Move a list to `position` (0-based, clamped) and renumber the rest.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the list does not exist.
    pub fn move_list(&self, id: Uuid, position: usize) -> Result<Vec<List>, ListAllError> {
        self.move_within(Scope::Lists, id, position, "List")?;
        self.all_lists(true)
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    /// Add an item at the end of a list.
    ///
    /// # Errors
    ///
    /// Returns an error if the title is blank, the quantity is zero, or the
    /// list does not exist.
    pub fn add_item(&self, list_id: Uuid, draft: &NewItem) -> Result<Item, ListAllError> {
        clean_text(&draft.title, "Item title")?;
        check_quantity(draft.quantity)?;
        self.require_list(list_id)?;

        let item = Item::new(list_id, draft, self.next_order(Scope::Items(list_id))?);
        self.insert_item(&item)?;
        tracing::debug!(id = %item.id, list = %list_id, "added item");
        Ok(item)
    }

    /// Insert a fully-formed item, keeping its id and timestamps.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_item(&self, item: &Item) -> Result<(), ListAllError> {
        self.conn
            .execute(
                "INSERT INTO items (id, list_id, title, description, quantity, order_number,
                                    is_crossed_out, created_at, modified_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    item.id.to_string(),
                    item.list_id.to_string(),
                    item.title,
                    item.description,
                    item.quantity,
                    item.order_number,
                    item.is_crossed_out,
                    item.created_at.to_rfc3339(),
                    item.modified_at.to_rfc3339(),
                ],
            )
            .map_err(|e| ListAllError::db("Failed to insert item", &e))?;
        Ok(())
    }

    /// Persist every column of an existing item.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the item does not exist.
    pub fn save_item(&self, item: &Item) -> Result<(), ListAllError> {
        let changed = self
            .conn
            .execute(
                "UPDATE items SET list_id = ?1, title = ?2, description = ?3, quantity = ?4,
                                  order_number = ?5, is_crossed_out = ?6, modified_at = ?7
                 WHERE id = ?8",
                params![
                    item.list_id.to_string(),
                    item.title,
                    item.description,
                    item.quantity,
                    item.order_number,
                    item.is_crossed_out,
                    item.modified_at.to_rfc3339(),
                    item.id.to_string(),
                ],
            )
            .map_err(|e| ListAllError::db("Failed to update item", &e))?;

        if changed == 0 {
            return Err(ListAllError::NotFound(format!("Item {}", item.id)));
        }
        Ok(())
    }

    /// Fetch an item by id (without images).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_item(&self, id: Uuid) -> Result<Option<Item>, ListAllError> {
        self.conn
            .query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"),
                [id.to_string()],
                row_to_item,
            )
            .optional()
            .map_err(|e| ListAllError::db("Failed to query item", &e))
    }

    /// Resolve an item from its full id or a unique id prefix.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if nothing matches, `InvalidInput` if a prefix is ambiguous.
    pub fn resolve_item(&self, token: &str) -> Result<Item, ListAllError> {
        let id = match Uuid::parse_str(token.trim()) {
            Ok(id) => id,
            Err(_) => self.resolve_prefix(Scope::Items(Uuid::nil()), token, "Item")?,
        };
        self.require_item(id)
    }

    /// Items of a list in display order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn items_for_list(&self, list_id: Uuid) -> Result<Vec<Item>, ListAllError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {ITEM_COLUMNS} FROM items WHERE list_id = ?1 ORDER BY order_number, created_at"
            ))
            .map_err(|e| ListAllError::db("Failed to prepare query", &e))?;
        let rows = stmt
            .query_map([list_id.to_string()], row_to_item)
            .map_err(|e| ListAllError::db("Failed to query items", &e))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| ListAllError::db("Failed to read item row", &e))
    }

    /// Apply a partial update and bump the modification time.
    ///
    /// # Errors
    ///
    /// Returns an error if a new value is invalid or the item does not exist.
    pub fn update_item(&self, id: Uuid, update: &ItemUpdate) -> Result<Item, ListAllError> {
        let mut item = self.require_item(id)?;
        if update.is_empty() {
            return Ok(item);
        }

        if let Some(title) = &update.title {
            item.title = clean_text(title, "Item title")?;
        }
        if let Some(description) = &update.description {
            item.description = description.trim().to_string();
        }
        if let Some(quantity) = update.quantity {
            check_quantity(quantity)?;
            item.quantity = quantity;
        }
        if let Some(crossed_out) = update.is_crossed_out {
            item.is_crossed_out = crossed_out;
        }
        item.modified_at = Utc::now();

        self.save_item(&item)?;
        Ok(item)
    }

    /// Flip the completed flag.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the item does not exist.
    pub fn toggle_item(&self, id: Uuid) -> Result<Item, ListAllError> {
        let current = self.require_item(id)?;
        self.update_item(
            id,
            &ItemUpdate {
                is_crossed_out: Some(!current.is_crossed_out),
                ..ItemUpdate::default()
            },
        )
    }

    /// Delete an item and its images, then close the order gap in its list.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the item does not exist.
    pub fn delete_item(&self, id: Uuid) -> Result<(), ListAllError> {
        let item = self.require_item(id)?;
        self.conn
            .execute("DELETE FROM items WHERE id = ?1", [id.to_string()])
            .map_err(|e| ListAllError::db("Failed to delete item", &e))?;
        tracing::debug!(%id, "deleted item");
        self.repack(Scope::Items(item.list_id))
    }

    /// Move an item to the end of another list.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the item or the target list does not exist.
    pub fn move_item_to_list(&self, id: Uuid, target_list: Uuid) -> Result<Item, ListAllError> {
        let mut item = self.require_item(id)?;
        self.require_list(target_list)?;
        if item.list_id == target_list {
            return Ok(item);
        }

        let source_list = item.list_id;
        item.list_id = target_list;
        item.order_number = self.next_order(Scope::Items(target_list))?;
        item.modified_at = Utc::now();
        self.save_item(&item)?;
        self.repack(Scope::Items(source_list))?;

        tracing::debug!(%id, from = %source_list, to = %target_list, "moved item");
        Ok(item)
    }

    /// Move an item to `position` within its list.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the item does not exist.
    pub fn move_item(&self, id: Uuid, position: usize) -> Result<Vec<Item>, ListAllError> {
        let item = self.require_item(id)?;
        self.move_within(Scope::Items(item.list_id), id, position, "Item")?;
        self.items_for_list(item.list_id)
    }

    /// Remove every crossed-out item from a list. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_crossed_out_items(&self, list_id: Uuid) -> Result<usize, ListAllError> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM items WHERE list_id = ?1 AND is_crossed_out = 1",
                [list_id.to_string()],
            )
            .map_err(|e| ListAllError::db("Failed to delete crossed-out items", &e))?;
        self.repack(Scope::Items(list_id))?;
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Images
    // ------------------------------------------------------------------

    /// Attach an image payload at the end of an item's images.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is empty or the item does not exist.
    pub fn attach_image(&self, item_id: Uuid, data: Vec<u8>) -> Result<ItemImage, ListAllError> {
        if data.is_empty() {
            return Err(ListAllError::InvalidInput("Image payload is empty".to_string()));
        }
        self.require_item(item_id)?;

        let image = ItemImage::new(item_id, data, self.next_order(Scope::Images(item_id))?);
        self.insert_image(&image)?;
        tracing::debug!(id = %image.id, item = %item_id, bytes = image.size(), "attached image");
        Ok(image)
    }

    /// Insert a fully-formed image record.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_image(&self, image: &ItemImage) -> Result<(), ListAllError> {
        self.conn
            .execute(
                "INSERT INTO item_images (id, item_id, data, order_number, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    image.id.to_string(),
                    image.item_id.to_string(),
                    image.data,
                    image.order_number,
                    image.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| ListAllError::db("Failed to insert image", &e))?;
        Ok(())
    }

    /// Images of an item in display order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn images_for_item(&self, item_id: Uuid) -> Result<Vec<ItemImage>, ListAllError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {IMAGE_COLUMNS} FROM item_images WHERE item_id = ?1
                 ORDER BY order_number, created_at"
            ))
            .map_err(|e| ListAllError::db("Failed to prepare query", &e))?;
        let rows = stmt
            .query_map([item_id.to_string()], row_to_image)
            .map_err(|e| ListAllError::db("Failed to query images", &e))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| ListAllError::db("Failed to read image row", &e))
    }

    /// Fetch an image by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_image(&self, id: Uuid) -> Result<Option<ItemImage>, ListAllError> {
        self.conn
            .query_row(
                &format!("SELECT {IMAGE_COLUMNS} FROM item_images WHERE id = ?1"),
                [id.to_string()],
                row_to_image,
            )
            .optional()
            .map_err(|e| ListAllError::db("Failed to query image", &e))
    }

    /// Resolve an image from its full id or a unique id prefix.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if nothing matches, `InvalidInput` if a prefix is ambiguous.
    pub fn resolve_image(&self, token: &str) -> Result<ItemImage, ListAllError> {
        let id = match Uuid::parse_str(token.trim()) {
            Ok(id) => id,
            Err(_) => self.resolve_prefix(Scope::Images(Uuid::nil()), token, "Image")?,
        };
        self.get_image(id)?
            .ok_or_else(|| ListAllError::NotFound(format!("Image {id}")))
    }

    /// Detach an image and close the order gap.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the image does not exist.
    pub fn delete_image(&self, id: Uuid) -> Result<(), ListAllError> {
        let image = self
            .get_image(id)?
            .ok_or_else(|| ListAllError::NotFound(format!("Image {id}")))?;
        self.conn
            .execute("DELETE FROM item_images WHERE id = ?1", [id.to_string()])
            .map_err(|e| ListAllError::db("Failed to delete image", &e))?;
        self.repack(Scope::Images(image.item_id))
    }

    // ------------------------------------------------------------------
    // Aggregates
    // ------------------------------------------------------------------

    /// A list with its items (and optionally their images) filled in.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the list does not exist.
    pub fn list_with_items(&self, id: Uuid, with_images: bool) -> Result<List, ListAllError> {
        let mut list = self.require_list(id)?;
        self.fill_items(&mut list, with_images)?;
        Ok(list)
    }

    /// Every list with items filled in, in display order.
    ///
    /// # Errors
    ///
    /// Returns an error if any query fails.
    pub fn lists_with_items(
        &self,
        include_archived: bool,
        with_images: bool,
    ) -> Result<Vec<List>, ListAllError> {
        let mut lists = self.all_lists(include_archived)?;
        for list in &mut lists {
            self.fill_items(list, with_images)?;
        }
        Ok(lists)
    }

    fn fill_items(&self, list: &mut List, with_images: bool) -> Result<(), ListAllError> {
        list.items = self.items_for_list(list.id)?;
        if with_images {
            for item in &mut list.items {
                item.images = self.images_for_item(item.id)?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // User data
    // ------------------------------------------------------------------

    /// Load the preferences record, creating it with defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the query or the initial insert fails.
    pub fn load_user_data(&self) -> Result<UserData, ListAllError> {
        let existing = self
            .conn
            .query_row(
                "SELECT user_id, show_crossed_out_items, default_import_strategy,
                        default_export_format, last_sync_date, created_at
                 FROM user_data WHERE id = 1",
                [],
                row_to_user_data,
            )
            .optional()
            .map_err(|e| ListAllError::db("Failed to query user data", &e))?;

        match existing {
            Some(data) => Ok(data),
            None => {
                let data = UserData::default();
                self.save_user_data(&data)?;
                Ok(data)
            }
        }
    }

    /// Store the preferences record.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save_user_data(&self, data: &UserData) -> Result<(), ListAllError> {
        self.conn
            .execute(
                "INSERT INTO user_data (id, user_id, show_crossed_out_items, default_import_strategy,
                                        default_export_format, last_sync_date, created_at)
                 VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                    user_id = excluded.user_id,
                    show_crossed_out_items = excluded.show_crossed_out_items,
                    default_import_strategy = excluded.default_import_strategy,
                    default_export_format = excluded.default_export_format,
                    last_sync_date = excluded.last_sync_date",
                params![
                    data.user_id,
                    data.show_crossed_out_items,
                    data.default_import_strategy.as_str(),
                    data.default_export_format.as_str(),
                    data.last_sync_date.map(|t| t.to_rfc3339()),
                    data.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| ListAllError::db("Failed to save user data", &e))?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Ordering helpers
    // ------------------------------------------------------------------

    /// Display position a newly appended list would take.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn next_list_order(&self) -> Result<i64, ListAllError> {
        self.next_order(Scope::Lists)
    }

    /// Display position a newly appended item of `list_id` would take.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn next_item_order(&self, list_id: Uuid) -> Result<i64, ListAllError> {
        self.next_order(Scope::Items(list_id))
    }

    /// Display position a newly attached image of `item_id` would take.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn next_image_order(&self, item_id: Uuid) -> Result<i64, ListAllError> {
        self.next_order(Scope::Images(item_id))
    }

    fn require_list(&self, id: Uuid) -> Result<List, ListAllError> {
        self.get_list(id)?
            .ok_or_else(|| ListAllError::NotFound(format!("List {id}")))
    }

    fn require_item(&self, id: Uuid) -> Result<Item, ListAllError> {
        self.get_item(id)?
            .ok_or_else(|| ListAllError::NotFound(format!("Item {id}")))
    }

    fn where_clause(scope: Scope) -> String {
        scope
            .owner_column()
            .map(|column| format!("WHERE {column} = ?1"))
            .unwrap_or_default()
    }

    fn next_order(&self, scope: Scope) -> Result<i64, ListAllError> {
        let sql = format!(
            "SELECT COALESCE(MAX(order_number) + 1, 0) FROM {} {}",
            scope.table(),
            Self::where_clause(scope)
        );
        let result = match scope.owner() {
            Some(owner) => self.conn.query_row(&sql, [owner.to_string()], |row| row.get(0)),
            None => self.conn.query_row(&sql, [], |row| row.get(0)),
        };
        result.map_err(|e| ListAllError::db("Failed to compute next order", &e))
    }

    fn order_rows(&self, scope: Scope) -> Result<Vec<OrderRow>, ListAllError> {
        let sql = format!(
            "SELECT id, order_number FROM {} {} ORDER BY order_number, created_at",
            scope.table(),
            Self::where_clause(scope)
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| ListAllError::db("Failed to prepare query", &e))?;

        let map = |row: &Row<'_>| -> rusqlite::Result<OrderRow> {
            Ok(OrderRow {
                id: uuid_at(row, 0)?,
                order: row.get(1)?,
            })
        };
        let rows = match scope.owner() {
            Some(owner) => stmt.query_map([owner.to_string()], map),
            None => stmt.query_map([], map),
        }
        .map_err(|e| ListAllError::db("Failed to query order", &e))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| ListAllError::db("Failed to read order row", &e))
    }

    fn write_orders(&self, scope: Scope, rows: &[OrderRow]) -> Result<(), ListAllError> {
        let sql = format!("UPDATE {} SET order_number = ?1 WHERE id = ?2", scope.table());
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| ListAllError::db("Failed to prepare update", &e))?;
        for row in rows {
            stmt.execute(params![row.order, row.id.to_string()])
                .map_err(|e| ListAllError::db("Failed to update order", &e))?;
        }
        Ok(())
    }

    /// Renumber a scope to `0..n`, writing only rows that changed.
    fn repack(&self, scope: Scope) -> Result<(), ListAllError> {
        let mut rows = self.order_rows(scope)?;
        let changed: Vec<OrderRow> = normalize_order(&mut rows)
            .into_iter()
            .map(|index| rows[index].clone())
            .collect();
        self.write_orders(scope, &changed)
    }

    fn move_within(
        &self,
        scope: Scope,
        id: Uuid,
        position: usize,
        kind: &str,
    ) -> Result<(), ListAllError> {
        let mut rows = self.order_rows(scope)?;
        let from = rows
            .iter()
            .position(|row| row.id == id)
            .ok_or_else(|| ListAllError::NotFound(format!("{kind} {id}")))?;

        move_to_position(&mut rows, from, position);
        self.write_orders(scope, &rows)
    }

    /// Find the single row in a scope's table whose id starts with `prefix`.
    fn resolve_prefix(&self, scope: Scope, prefix: &str, kind: &str) -> Result<Uuid, ListAllError> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.len() < 4 || !prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
            return Err(ListAllError::NotFound(format!("{kind} '{prefix}'")));
        }

        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT id FROM {} WHERE id LIKE ?1 || '%' LIMIT 2",
                scope.table()
            ))
            .map_err(|e| ListAllError::db("Failed to prepare query", &e))?;
        let ids = stmt
            .query_map([&prefix], |row| uuid_at(row, 0))
            .map_err(|e| ListAllError::db("Failed to query ids", &e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| ListAllError::db("Failed to read id", &e))?;

        match ids.as_slice() {
            [id] => Ok(*id),
            [] => Err(ListAllError::NotFound(format!("{kind} '{prefix}'"))),
            _ => Err(ListAllError::InvalidInput(format!(
                "{kind} id prefix '{prefix}' is ambiguous"
            ))),
        }
    }
}

fn clean_text(raw: &str, what: &str) -> Result<String, ListAllError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ListAllError::InvalidInput(format!("{what} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

fn check_quantity(quantity: u32) -> Result<(), ListAllError> {
    if quantity == 0 {
        return Err(ListAllError::InvalidInput(
            "Quantity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn time_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn row_to_list(row: &Row<'_>) -> rusqlite::Result<List> {
    Ok(List {
        id: uuid_at(row, 0)?,
        name: row.get(1)?,
        order_number: row.get(2)?,
        is_archived: row.get(3)?,
        created_at: time_at(row, 4)?,
        modified_at: time_at(row, 5)?,
        items: Vec::new(),
    })
}

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: uuid_at(row, 0)?,
        list_id: uuid_at(row, 1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        quantity: row.get(4)?,
        order_number: row.get(5)?,
        is_crossed_out: row.get(6)?,
        created_at: time_at(row, 7)?,
        modified_at: time_at(row, 8)?,
        images: Vec::new(),
    })
}

fn row_to_image(row: &Row<'_>) -> rusqlite::Result<ItemImage> {
    Ok(ItemImage {
        id: uuid_at(row, 0)?,
        item_id: uuid_at(row, 1)?,
        data: row.get(2)?,
        order_number: row.get(3)?,
        created_at: time_at(row, 4)?,
    })
}

fn row_to_user_data(row: &Row<'_>) -> rusqlite::Result<UserData> {
    let strategy: String = row.get(2)?;
    let format: String = row.get(3)?;
    let last_sync: Option<String> = row.get(4)?;

    Ok(UserData {
        user_id: row.get(0)?,
        show_crossed_out_items: row.get(1)?,
        default_import_strategy: strategy.parse::<ImportStrategy>().unwrap_or_default(),
        default_export_format: format.parse::<ExportFormat>().unwrap_or_default(),
        last_sync_date: match last_sync {
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(&raw)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|e| conversion_error(4, e))?,
            ),
            None => None,
        },
        created_at: time_at(row, 5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    fn titles(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.title.as_str()).collect()
    }

    fn orders<T: Ordered>(records: &[T]) -> Vec<i64> {
        records.iter().map(Ordered::order_number).collect()
    }

    #[test]
    fn test_create_lists_in_order() {
        let db = Database::open_in_memory().unwrap();
        let store = db.store();

        store.create_list("Groceries").unwrap();
        store.create_list("Hardware").unwrap();

        let lists = store.all_lists(false).unwrap();
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].name, "Groceries");
        assert_eq!(orders(&lists), vec![0, 1]);
    }

    #[test]
    fn test_blank_list_name_rejected() {
        let db = Database::open_in_memory().unwrap();
        let err = db.store().create_list("   ").unwrap_err();
        assert!(matches!(err, ListAllError::InvalidInput(_)));
    }

    #[test]
    fn test_resolve_list_by_name_id_and_prefix() {
        let db = Database::open_in_memory().unwrap();
        let store = db.store();
        let list = store.create_list("Groceries").unwrap();

        assert_eq!(store.resolve_list("groceries").unwrap().id, list.id);
        assert_eq!(store.resolve_list(&list.id.to_string()).unwrap().id, list.id);
        assert_eq!(store.resolve_list(&list.id.to_string()[..8]).unwrap().id, list.id);
        assert!(matches!(
            store.resolve_list("Pharmacy").unwrap_err(),
            ListAllError::NotFound(_)
        ));
    }

    #[test]
    fn test_rename_bumps_modified() {
        let db = Database::open_in_memory().unwrap();
        let store = db.store();
        let list = store.create_list("Grocereis").unwrap();

        let renamed = store.rename_list(list.id, "Groceries").unwrap();

        assert_eq!(renamed.name, "Groceries");
        assert_eq!(renamed.id, list.id);
        assert!(renamed.modified_at >= list.modified_at);
        assert_eq!(renamed.created_at, list.created_at);
    }

    #[test]
    fn test_archived_lists_hidden_by_default() {
        let db = Database::open_in_memory().unwrap();
        let store = db.store();
        let list = store.create_list("Old").unwrap();
        store.create_list("Current").unwrap();

        store.set_archived(list.id, true).unwrap();

        assert_eq!(store.all_lists(false).unwrap().len(), 1);
        assert_eq!(store.all_lists(true).unwrap().len(), 2);
    }

    #[test]
    fn test_delete_list_cascades_and_repacks() {
        let db = Database::open_in_memory().unwrap();
        let store = db.store();
        let first = store.create_list("First").unwrap();
        store.create_list("Second").unwrap();
        let item = store.add_item(first.id, &NewItem::titled("Milk")).unwrap();
        let image = store.attach_image(item.id, vec![1, 2, 3]).unwrap();

        store.delete_list(first.id).unwrap();

        assert!(store.get_item(item.id).unwrap().is_none());
        assert!(store.get_image(image.id).unwrap().is_none());
        let lists = store.all_lists(true).unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].order_number, 0);
    }

    #[test]
    fn test_move_list() {
        let db = Database::open_in_memory().unwrap();
        let store = db.store();
        let a = store.create_list("A").unwrap();
        store.create_list("B").unwrap();
        store.create_list("C").unwrap();

        let lists = store.move_list(a.id, 2).unwrap();

        let names: Vec<_> = lists.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
        assert_eq!(orders(&lists), vec![0, 1, 2]);
    }

    #[test]
    fn test_add_item_validation() {
        let db = Database::open_in_memory().unwrap();
        let store = db.store();
        let list = store.create_list("Groceries").unwrap();

        let zero = NewItem {
            quantity: 0,
            ..NewItem::titled("Eggs")
        };
        assert!(matches!(
            store.add_item(list.id, &zero).unwrap_err(),
            ListAllError::InvalidInput(_)
        ));
        assert!(matches!(
            store.add_item(Uuid::new_v4(), &NewItem::titled("Eggs")).unwrap_err(),
            ListAllError::NotFound(_)
        ));
    }

    #[test]
    fn test_items_keep_order_after_delete() {
        let db = Database::open_in_memory().unwrap();
        let store = db.store();
        let list = store.create_list("Groceries").unwrap();
        store.add_item(list.id, &NewItem::titled("Milk")).unwrap();
        let bread = store.add_item(list.id, &NewItem::titled("Bread")).unwrap();
        store.add_item(list.id, &NewItem::titled("Eggs")).unwrap();

        store.delete_item(bread.id).unwrap();

        let items = store.items_for_list(list.id).unwrap();
        assert_eq!(titles(&items), vec!["Milk", "Eggs"]);
        assert_eq!(orders(&items), vec![0, 1]);
    }

    #[test]
    fn test_update_and_toggle_item() {
        let db = Database::open_in_memory().unwrap();
        let store = db.store();
        let list = store.create_list("Groceries").unwrap();
        let item = store.add_item(list.id, &NewItem::titled("Milk")).unwrap();

        let updated = store
            .update_item(
                item.id,
                &ItemUpdate {
                    quantity: Some(2),
                    description: Some(" whole ".to_string()),
                    ..ItemUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.quantity, 2);
        assert_eq!(updated.description, "whole");

        let toggled = store.toggle_item(item.id).unwrap();
        assert!(toggled.is_crossed_out);
        let toggled = store.toggle_item(item.id).unwrap();
        assert!(!toggled.is_crossed_out);
    }

    #[test]
    fn test_move_item_between_lists() {
        let db = Database::open_in_memory().unwrap();
        let store = db.store();
        let groceries = store.create_list("Groceries").unwrap();
        let hardware = store.create_list("Hardware").unwrap();
        let milk = store.add_item(groceries.id, &NewItem::titled("Milk")).unwrap();
        store.add_item(groceries.id, &NewItem::titled("Bread")).unwrap();
        store.add_item(hardware.id, &NewItem::titled("Nails")).unwrap();

        let moved = store.move_item_to_list(milk.id, hardware.id).unwrap();

        assert_eq!(moved.list_id, hardware.id);
        let source = store.items_for_list(groceries.id).unwrap();
        assert_eq!(titles(&source), vec!["Bread"]);
        assert_eq!(orders(&source), vec![0]);
        let target = store.items_for_list(hardware.id).unwrap();
        assert_eq!(titles(&target), vec!["Nails", "Milk"]);
        assert_eq!(orders(&target), vec![0, 1]);
    }

    #[test]
    fn test_reorder_item() {
        let db = Database::open_in_memory().unwrap();
        let store = db.store();
        let list = store.create_list("Groceries").unwrap();
        store.add_item(list.id, &NewItem::titled("Milk")).unwrap();
        store.add_item(list.id, &NewItem::titled("Bread")).unwrap();
        let eggs = store.add_item(list.id, &NewItem::titled("Eggs")).unwrap();

        let items = store.move_item(eggs.id, 0).unwrap();

        assert_eq!(titles(&items), vec!["Eggs", "Milk", "Bread"]);
        assert_eq!(orders(&items), vec![0, 1, 2]);
    }

    #[test]
    fn test_delete_crossed_out_items() {
        let db = Database::open_in_memory().unwrap();
        let store = db.store();
        let list = store.create_list("Groceries").unwrap();
        let milk = store.add_item(list.id, &NewItem::titled("Milk")).unwrap();
        store.add_item(list.id, &NewItem::titled("Bread")).unwrap();
        store.toggle_item(milk.id).unwrap();

        assert_eq!(store.delete_crossed_out_items(list.id).unwrap(), 1);

        let items = store.items_for_list(list.id).unwrap();
        assert_eq!(titles(&items), vec!["Bread"]);
        assert_eq!(orders(&items), vec![0]);
    }

    #[test]
    fn test_images_attach_and_delete() {
        let db = Database::open_in_memory().unwrap();
        let store = db.store();
        let list = store.create_list("Groceries").unwrap();
        let item = store.add_item(list.id, &NewItem::titled("Milk")).unwrap();

        let first = store.attach_image(item.id, vec![1]).unwrap();
        let second = store.attach_image(item.id, vec![2, 2]).unwrap();
        assert_eq!(second.order_number, 1);

        store.delete_image(first.id).unwrap();

        let images = store.images_for_item(item.id).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].data, vec![2, 2]);
        assert_eq!(images[0].order_number, 0);
        assert!(store.attach_image(item.id, Vec::new()).is_err());
    }

    #[test]
    fn test_list_with_items_aggregate() {
        let db = Database::open_in_memory().unwrap();
        let store = db.store();
        let list = store.create_list("Groceries").unwrap();
        let item = store.add_item(list.id, &NewItem::titled("Milk")).unwrap();
        store.attach_image(item.id, vec![9]).unwrap();

        let without = store.list_with_items(list.id, false).unwrap();
        assert_eq!(without.items.len(), 1);
        assert!(without.items[0].images.is_empty());

        let with = store.lists_with_items(false, true).unwrap();
        assert_eq!(with[0].items[0].images.len(), 1);
    }

    #[test]
    fn test_user_data_created_on_first_load() {
        let db = Database::open_in_memory().unwrap();
        let store = db.store();

        let mut prefs = store.load_user_data().unwrap();
        let again = store.load_user_data().unwrap();
        assert_eq!(prefs.user_id, again.user_id);

        prefs.default_import_strategy = ImportStrategy::Append;
        prefs.show_crossed_out_items = false;
        prefs.last_sync_date = Some(Utc::now());
        store.save_user_data(&prefs).unwrap();

        let loaded = store.load_user_data().unwrap();
        assert_eq!(loaded.default_import_strategy, ImportStrategy::Append);
        assert!(!loaded.show_crossed_out_items);
        assert_eq!(loaded.last_sync_date, prefs.last_sync_date);
    }

    #[test]
    fn test_timestamps_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let store = db.store();
        let list = store.create_list("Groceries").unwrap();

        let loaded = store.get_list(list.id).unwrap().unwrap();
        assert_eq!(loaded, list);
    }
}
