//! Menu Item Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce;

/// Menu item as cached for rendering
///
/// Built from `menu_items` rows with loose coercion: numeric columns fall back
/// to 0, flags follow truthiness, and `desc`/`img` default to empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub img: String,
    /// Category reference (`categories.id`), if any
    pub cat_id: Option<String>,
    pub available: bool,
    pub fresh: bool,
    pub rating_avg: f64,
    pub rating_count: i64,
    /// ISO-8601 creation timestamp as returned by the backend
    #[serde(default)]
    pub created_at: String,
}

impl MenuItem {
    /// Build from a raw backend row.
    pub fn from_row(row: &Value) -> Self {
        Self {
            id: coerce::text(row.get("id")),
            name: coerce::text(row.get("name")),
            desc: coerce::text(row.get("desc")),
            price: coerce::decimal(row.get("price")),
            img: coerce::text(row.get("img")),
            cat_id: coerce::opt_text(row.get("cat_id")),
            available: coerce::truthy(row.get("available")),
            fresh: coerce::truthy(row.get("fresh")),
            rating_avg: coerce::number(row.get("rating_avg")),
            rating_count: coerce::integer(row.get("rating_count")),
            created_at: coerce::text(row.get("created_at")),
        }
    }
}
