//! Category Model

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce;

/// Menu category, mirrored read-only from the `categories` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Display order (ascending)
    pub sort: i64,
}

impl Category {
    /// Build from a raw backend row.
    pub fn from_row(row: &Value) -> Self {
        Self {
            id: coerce::text(row.get("id")),
            name: coerce::text(row.get("name")),
            sort: coerce::integer(row.get("sort")),
        }
    }
}
