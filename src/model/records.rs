//! Portable list records used by exports and imports.
//!
//! Every field that a given format may not carry is optional: a plain-text
//! import knows neither ids nor timestamps, a minimal JSON export omits
//! descriptions. Consumers decide what a missing value means.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Item, ItemImage, List};

/// Version written into JSON exports.
pub const EXPORT_VERSION: u32 = 1;

/// Top-level JSON export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: u32,
    pub export_date: DateTime<Utc>,
    pub lists: Vec<ListRecord>,
}

impl ExportDocument {
    #[must_use]
    pub fn new(lists: Vec<ListRecord>) -> Self {
        Self {
            version: EXPORT_VERSION,
            export_date: Utc::now(),
            lists,
        }
    }
}

/// A list as it travels between stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<ItemRecord>,
}

impl ListRecord {
    /// A bare, named list with no identity.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            ..Self::default()
        }
    }
}

/// An item as it travels between stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_crossed_out: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageRecord>,
}

impl ItemRecord {
    #[must_use]
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.trim().to_string(),
            ..Self::default()
        }
    }
}

/// An image payload as it travels between stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(with = "super::base64_bytes")]
    pub image_data: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&List> for ListRecord {
    fn from(list: &List) -> Self {
        Self {
            id: Some(list.id),
            name: list.name.clone(),
            order_number: Some(list.order_number),
            is_archived: Some(list.is_archived),
            created_at: Some(list.created_at),
            modified_at: Some(list.modified_at),
            items: list.items.iter().map(ItemRecord::from).collect(),
        }
    }
}

impl From<&Item> for ItemRecord {
    fn from(item: &Item) -> Self {
        Self {
            id: Some(item.id),
            title: item.title.clone(),
            description: Some(item.description.clone()),
            quantity: Some(item.quantity),
            order_number: Some(item.order_number),
            is_crossed_out: Some(item.is_crossed_out),
            created_at: Some(item.created_at),
            modified_at: Some(item.modified_at),
            images: item.images.iter().map(ImageRecord::from).collect(),
        }
    }
}

impl From<&ItemImage> for ImageRecord {
    fn from(image: &ItemImage) -> Self {
        Self {
            id: Some(image.id),
            image_data: image.data.clone(),
            order_number: Some(image.order_number),
            created_at: Some(image.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewItem;

    #[test]
    fn test_record_from_list_carries_identity() {
        let mut list = List::new("Groceries", 0);
        list.items.push(Item::new(list.id, &NewItem::titled("Milk"), 0));

        let record = ListRecord::from(&list);

        assert_eq!(record.id, Some(list.id));
        assert_eq!(record.modified_at, Some(list.modified_at));
        assert_eq!(record.items.len(), 1);
        assert_eq!(record.items[0].quantity, Some(1));
        assert_eq!(record.items[0].is_crossed_out, Some(false));
    }

    #[test]
    fn test_minimal_json_record_parses() {
        let record: ListRecord =
            serde_json::from_str(r#"{"name":"Groceries","items":[{"title":"Milk"}]}"#).unwrap();

        assert!(record.id.is_none());
        assert_eq!(record.items[0].title, "Milk");
        assert!(record.items[0].quantity.is_none());
        assert!(record.items[0].images.is_empty());
    }

    #[test]
    fn test_document_uses_camel_case() {
        let doc = ExportDocument::new(vec![ListRecord::named("Groceries")]);
        let json = serde_json::to_string(&doc).unwrap();

        assert!(json.contains("\"exportDate\""));
        assert!(json.contains("\"version\":1"));
    }
}
