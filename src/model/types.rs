use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::Ordered;

/// A user-facing list, e.g. "Groceries".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: Uuid,
    pub name: String,
    pub order_number: i64,
    #[serde(default)]
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    /// Populated only by aggregate queries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Item>,
}

impl List {
    /// Create a new, unsaved list with a fresh identifier.
    #[must_use]
    pub fn new(name: &str, order_number: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            order_number,
            is_archived: false,
            created_at: now,
            modified_at: now,
            items: Vec::new(),
        }
    }

    /// Number of items not yet crossed out.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.items.iter().filter(|i| !i.is_crossed_out).count()
    }

    /// Number of crossed-out items.
    #[must_use]
    pub fn crossed_out_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_crossed_out).count()
    }
}

/// An entry in a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    pub list_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub quantity: u32,
    pub order_number: i64,
    #[serde(default)]
    pub is_crossed_out: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ItemImage>,
}

impl Item {
    /// Create a new, unsaved item belonging to `list_id`.
    #[must_use]
    pub fn new(list_id: Uuid, draft: &NewItem, order_number: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            list_id,
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            quantity: draft.quantity,
            order_number,
            is_crossed_out: false,
            created_at: now,
            modified_at: now,
            images: Vec::new(),
        }
    }
}

/// Fields supplied when adding an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub title: String,
    pub description: String,
    pub quantity: u32,
}

impl NewItem {
    #[must_use]
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            description: String::new(),
            quantity: 1,
        }
    }
}

/// Partial update of an item. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<u32>,
    pub is_crossed_out: Option<bool>,
}

impl ItemUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.quantity.is_none()
            && self.is_crossed_out.is_none()
    }
}

/// A picture attached to an item. The payload never changes after attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemImage {
    pub id: Uuid,
    pub item_id: Uuid,
    #[serde(with = "super::base64_bytes", rename = "imageData")]
    pub data: Vec<u8>,
    pub order_number: i64,
    pub created_at: DateTime<Utc>,
}

impl ItemImage {
    #[must_use]
    pub fn new(item_id: Uuid, data: Vec<u8>, order_number: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_id,
            data,
            order_number,
            created_at: Utc::now(),
        }
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Per-user preferences. Exactly one record exists per container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub user_id: String,
    pub show_crossed_out_items: bool,
    pub default_import_strategy: ImportStrategy,
    pub default_export_format: ExportFormat,
    #[serde(default)]
    pub last_sync_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Default for UserData {
    fn default() -> Self {
        Self {
            user_id: Uuid::new_v4().to_string(),
            show_crossed_out_items: true,
            default_import_strategy: ImportStrategy::Merge,
            default_export_format: ExportFormat::Json,
            last_sync_date: None,
            created_at: Utc::now(),
        }
    }
}

/// How imported data combines with what is already stored.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStrategy {
    /// Delete every existing list, then insert the imported ones.
    Replace,
    /// Update matching lists and items, create the rest.
    #[default]
    Merge,
    /// Always create new lists, even when names collide.
    Append,
}

impl ImportStrategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Merge => "merge",
            Self::Append => "append",
        }
    }
}

impl std::fmt::Display for ImportStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ImportStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "merge" => Ok(Self::Merge),
            "append" => Ok(Self::Append),
            other => Err(format!("unknown import strategy '{other}'")),
        }
    }
}

/// Supported export (and import) data formats.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    #[value(alias = "txt", alias = "plain")]
    Text,
}

impl ExportFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "text",
        }
    }

    /// File extension used for exported files.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }

    /// Guess the format from a file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            "txt" | "text" => Some(Self::Text),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "text" | "txt" | "plain" => Ok(Self::Text),
            other => Err(format!("unknown export format '{other}'")),
        }
    }
}

impl Ordered for List {
    fn order_number(&self) -> i64 {
        self.order_number
    }

    fn set_order_number(&mut self, order: i64) {
        self.order_number = order;
    }
}

impl Ordered for Item {
    fn order_number(&self) -> i64 {
        self.order_number
    }

    fn set_order_number(&mut self, order: i64) {
        self.order_number = order;
    }
}

impl Ordered for ItemImage {
    fn order_number(&self) -> i64 {
        self.order_number
    }

    fn set_order_number(&mut self, order: i64) {
        self.order_number = order;
    }
}
