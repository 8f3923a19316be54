//! Data models
//!
//! Cached shapes for the catalog and reservation views. Rows come from the
//! backend as loose JSON and are normalized through `from_row` constructors.
//! All IDs are held as strings so numeric and UUID keys compare the same way.

pub mod category;
pub mod menu_item;
pub mod reservation;
pub mod session;

// Re-exports
pub use category::*;
pub use menu_item::*;
pub use reservation::*;
pub use session::*;
