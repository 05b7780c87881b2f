//! Catalog Item Model

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Menu category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Breakfast,
    Lunch,
    Dinner,
    Dessert,
    Drinks,
    Snack,
}

impl Category {
    /// Every menu category, in display order
    pub const ALL: &'static [Category] = &[
        Category::Breakfast,
        Category::Lunch,
        Category::Dinner,
        Category::Dessert,
        Category::Drinks,
        Category::Snack,
    ];
}

/// Catalog item entity
///
/// `available_quantity` is the authoritative stock figure. It is only
/// mutated through the stock ledger (settlement decrements, restocks)
/// and never goes negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub price: Decimal,
    pub available_quantity: u32,
    pub is_available: bool,
    /// Opaque reference to an externally stored image
    pub image_ref: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Create item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCreate {
    pub name: String,
    pub category: Category,
    pub price: Decimal,
    pub available_quantity: Option<u32>,
    pub is_available: Option<bool>,
    pub image_ref: Option<String>,
}

/// Update item payload
///
/// `available_quantity` is deliberately absent: stock moves through the
/// restock endpoint and settlement only.
///
/// `image_ref` is a double option: an absent field leaves the stored
/// reference unchanged, an explicit `null` clears it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub category: Option<Category>,
    pub price: Option<Decimal>,
    pub is_available: Option<bool>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_ref: Option<Option<String>>,
}

/// Maps a present field (including `null`) to `Some(...)`; absence
/// stays `None` via `#[serde(default)]`
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::deserialize(deserializer).map(Some)
}
