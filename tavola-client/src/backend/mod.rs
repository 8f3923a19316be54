//! Backend abstraction
//!
//! The bridge talks to its database through [`Backend`]: table queries,
//! auth session lookup and remote procedure calls. [`RestBackend`] speaks
//! PostgREST/GoTrue over HTTP; tests plug in their own implementations.

mod query;
pub mod rest;

pub use query::{Filter, Order, Query};
pub use rest::RestBackend;

use async_trait::async_trait;
use serde_json::{Map, Value};
use shared::Session;

use crate::ClientResult;

/// Row returned by the backend (JSON object)
pub type Row = Value;

/// Database + auth client used by the bridge
#[async_trait]
pub trait Backend: Send + Sync {
    /// Run a read query and return the matching rows.
    async fn select(&self, query: &Query) -> ClientResult<Vec<Row>>;

    /// Insert rows into `table`. With `returning = false` the backend is asked
    /// for no representation and an empty list is returned.
    async fn insert(
        &self,
        table: &str,
        rows: Vec<Map<String, Value>>,
        returning: bool,
    ) -> ClientResult<Vec<Row>>;

    /// Update rows matched by `query` filters and return them as selected by
    /// `query` columns.
    async fn update(&self, query: &Query, patch: Map<String, Value>) -> ClientResult<Vec<Row>>;

    /// Delete rows matched by `query` filters.
    async fn delete(&self, query: &Query) -> ClientResult<()>;

    /// Current auth session, if signed in.
    async fn session(&self) -> ClientResult<Option<Session>>;

    /// Invoke a remote procedure.
    async fn rpc(&self, function: &str, args: Value) -> ClientResult<Value>;
}
