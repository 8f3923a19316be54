//! Tavola Client - reservation & menu-catalog bridge
//!
//! Wraps a backend (PostgREST-style tables, auth session, remote procedures),
//! mirrors results into a local cache for synchronous reads, and gates admin
//! views behind a session + role check.

pub mod backend;
pub mod bridge;
pub mod cache;
pub mod config;
pub mod error;
pub mod event;
pub mod navigator;

pub use backend::{Backend, Query, RestBackend};
pub use bridge::{Bridge, PublicCatalog};
pub use cache::LocalCache;
pub use config::BridgeConfig;
pub use error::{ClientError, ClientResult};
pub use event::{BridgeEvent, EventBus};
pub use navigator::{LogNavigator, Navigator, RecordingNavigator};

// Re-export shared types for convenience
pub use shared::{
    Category, MenuItem, NewReservation, Reservation, ReservationField, ReservationPatch, Session,
    SessionUser,
};
