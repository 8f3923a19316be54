//! Shared types for Tavola
//!
//! Data models for the menu catalog and reservations, the loose value
//! coercion used to normalize backend rows, and small time/id helpers.

pub mod coerce;
pub mod models;
pub mod util;

// Re-exports
pub use models::{
    Category, MenuItem, NewReservation, Reservation, ReservationField, ReservationPatch, Session,
    SessionUser,
};
pub use serde::{Deserialize, Serialize};
