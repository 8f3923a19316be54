//! Bridge - catalog and reservation sync over a [`Backend`]
//!
//! Every operation talks to the backend exactly once per remote step, then
//! refreshes the local cache. Remote write and cache update are independent
//! steps; a failure between them leaves the cache stale until the next sync.
//!
//! Without a backend the bridge is inert: every operation returns `Ok(None)`
//! and touches nothing.

use std::sync::Arc;

use serde_json::json;
use shared::coerce;
use shared::util::{now_iso, temp_id};
use shared::{Category, MenuItem, NewReservation, Reservation, ReservationField, ReservationPatch};
use tokio::sync::broadcast;

use crate::backend::{Backend, Query};
use crate::cache::{CATEGORIES_KEY, LocalCache, MENU_ITEMS_KEY, RESERVATIONS_KEY};
use crate::config::{BridgeConfig, DEFAULT_ADMIN_RPC};
use crate::event::{BridgeEvent, EventBus};
use crate::navigator::{LogNavigator, Navigator};
use crate::{ClientError, ClientResult};

const CATEGORIES_TABLE: &str = "categories";
const MENU_ITEMS_TABLE: &str = "menu_items";
const RESERVATIONS_TABLE: &str = "reservations";

/// Result of a public catalog sync
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PublicCatalog {
    pub categories: Vec<Category>,
    pub items: Vec<MenuItem>,
}

/// Façade over the backend, the local cache and the event channel
#[derive(Clone)]
pub struct Bridge {
    backend: Option<Arc<dyn Backend>>,
    cache: LocalCache,
    events: EventBus,
    navigator: Arc<dyn Navigator>,
    admin_rpc: String,
}

impl Bridge {
    pub fn new(backend: Option<Arc<dyn Backend>>, cache: LocalCache) -> Self {
        Self {
            backend,
            cache,
            events: EventBus::default(),
            navigator: Arc::new(LogNavigator),
            admin_rpc: DEFAULT_ADMIN_RPC.to_string(),
        }
    }

    /// Build with cache, event capacity and admin procedure from `config`.
    pub fn from_config(config: &BridgeConfig, backend: Option<Arc<dyn Backend>>) -> Self {
        let cache = match &config.cache_path {
            Some(path) => LocalCache::open_or_memory(path),
            None => LocalCache::in_memory(),
        };
        Self::new(backend, cache)
            .with_events(EventBus::new(config.event_capacity))
            .with_admin_rpc(config.admin_rpc.clone())
    }

    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn with_admin_rpc(mut self, name: impl Into<String>) -> Self {
        self.admin_rpc = name.into();
        self
    }

    /// Whether a backend is configured
    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    /// Receive [`BridgeEvent`]s published after syncs and mutations
    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.events.subscribe()
    }

    // ========== Cached reads ==========

    pub fn cached_categories(&self) -> Vec<Category> {
        self.cache.get(CATEGORIES_KEY, Vec::new())
    }

    pub fn cached_menu_items(&self) -> Vec<MenuItem> {
        self.cache.get(MENU_ITEMS_KEY, Vec::new())
    }

    pub fn cached_reservations(&self) -> Vec<Reservation> {
        self.cache.get(RESERVATIONS_KEY, Vec::new())
    }

    // ========== Public catalog ==========

    /// Fetch categories (by `sort`) and available items (newest first),
    /// normalize, and mirror both into the cache.
    pub async fn sync_public_catalog(&self) -> ClientResult<Option<PublicCatalog>> {
        let Some(backend) = &self.backend else {
            return Ok(None);
        };

        let categories_query = Query::table(CATEGORIES_TABLE)
            .select("id,name,sort")
            .order("sort", true);
        let items_query = Query::table(MENU_ITEMS_TABLE)
            .eq("available", true)
            .order("created_at", false);

        let (category_rows, item_rows) = tokio::try_join!(
            backend.select(&categories_query),
            backend.select(&items_query)
        )?;

        let categories: Vec<Category> = category_rows.iter().map(Category::from_row).collect();
        let items: Vec<MenuItem> = item_rows
            .iter()
            .map(MenuItem::from_row)
            .filter(|item| item.available)
            .collect();

        self.cache.set(CATEGORIES_KEY, &categories);
        self.cache.set(MENU_ITEMS_KEY, &items);
        tracing::info!(
            categories = categories.len(),
            items = items.len(),
            "Public catalog synced"
        );

        Ok(Some(PublicCatalog { categories, items }))
    }

    // ========== Admin guard ==========

    /// Allow only signed-in admins; everyone else is redirected to `login_url`.
    ///
    /// Admin status comes from the admin remote procedure; if that errors or
    /// answers falsy, a restricted read on `reservations` is attempted and
    /// success is taken as admin access.
    ///
    /// The fallback read is only as strict as the backend's grants. Row-level
    /// security that filters rows answers `200 []` rather than an error, so any
    /// signed-in role with `SELECT` on `reservations` passes this guard. Deploy
    /// the admin procedure, or revoke `SELECT` from non-admin roles.
    pub async fn require_admin_or_redirect(&self, login_url: &str) -> ClientResult<Option<bool>> {
        let Some(backend) = &self.backend else {
            return Ok(None);
        };

        let session = match backend.session().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Session lookup failed");
                None
            }
        };
        let Some(session) = session else {
            tracing::warn!(login_url, "No session, redirecting");
            self.navigator.redirect(login_url);
            return Ok(Some(false));
        };

        if self.is_admin(backend.as_ref()).await {
            tracing::debug!(user_id = %session.user.id, "Admin access granted");
            return Ok(Some(true));
        }

        tracing::warn!(user_id = %session.user.id, login_url, "Not an admin, redirecting");
        self.navigator.redirect(login_url);
        Ok(Some(false))
    }

    async fn is_admin(&self, backend: &dyn Backend) -> bool {
        match backend.rpc(&self.admin_rpc, json!({})).await {
            Ok(answer) if coerce::truthy(Some(&answer)) => return true,
            Ok(answer) => tracing::debug!(rpc = %self.admin_rpc, %answer, "Admin check denied"),
            Err(e) => tracing::debug!(rpc = %self.admin_rpc, error = %e, "Admin check failed"),
        }

        // Sound only while non-admin roles lack SELECT on reservations
        let fallback = Query::table(RESERVATIONS_TABLE).select("id").limit(1);
        match backend.select(&fallback).await {
            Ok(_) => {
                tracing::warn!(rpc = %self.admin_rpc, "Admin granted by reservations read fallback");
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "Admin fallback read failed");
                false
            }
        }
    }

    // ========== Admin data ==========

    /// Fetch all reservations (by date), cache them and notify subscribers.
    pub async fn sync_admin_data(&self) -> ClientResult<Option<Vec<Reservation>>> {
        let Some(backend) = &self.backend else {
            return Ok(None);
        };

        let query = Query::table(RESERVATIONS_TABLE)
            .select(ReservationField::select_columns())
            .order(ReservationField::Date.column(), true);
        let rows = backend.select(&query).await?;

        let synced_at = now_iso();
        let reservations: Vec<Reservation> = rows
            .iter()
            .map(|row| Reservation::from_row(row, &synced_at))
            .collect();

        self.cache.set(RESERVATIONS_KEY, &reservations);
        tracing::info!(count = reservations.len(), "Admin data synced");
        self.events.emit(BridgeEvent::AdminSynced);

        Ok(Some(reservations))
    }

    // ========== Reservations ==========

    /// Insert a reservation and prepend an optimistic `tmp_` entry to the cache.
    ///
    /// The insert asks for no representation back, so anonymous callers with
    /// insert-only access can book.
    pub async fn create_reservation(
        &self,
        input: &NewReservation,
    ) -> ClientResult<Option<Reservation>> {
        let Some(backend) = &self.backend else {
            return Ok(None);
        };

        backend
            .insert(RESERVATIONS_TABLE, vec![input.to_row()], false)
            .await?;

        let entry = input.to_optimistic(temp_id(), &now_iso());
        let mut cached = self.cached_reservations();
        cached.insert(0, entry.clone());
        self.cache.set(RESERVATIONS_KEY, &cached);
        tracing::info!(id = %entry.id, "Reservation created");
        self.events.emit(BridgeEvent::AdminSynced);

        Ok(Some(entry))
    }

    /// Update reservation `id` with the fields present in `patch`.
    ///
    /// Returns the canonical row as selected back by the backend. Only the
    /// patched fields (and `updatedAt`) change on the cached entry.
    pub async fn update_reservation(
        &self,
        id: &str,
        patch: &ReservationPatch,
    ) -> ClientResult<Option<Reservation>> {
        let Some(backend) = &self.backend else {
            return Ok(None);
        };
        if patch.is_empty() {
            return Err(ClientError::Validation("empty reservation patch".into()));
        }

        let query = Query::table(RESERVATIONS_TABLE)
            .select(ReservationField::select_columns())
            .eq(ReservationField::Id.column(), id);
        let rows = backend.update(&query, patch.to_columns()).await?;
        let updated_at = now_iso();
        let canonical = rows
            .first()
            .map(|row| Reservation::from_row(row, &updated_at))
            .ok_or_else(|| ClientError::NotFound(format!("reservation {id}")))?;

        let mut cached = self.cached_reservations();
        for entry in cached.iter_mut().filter(|entry| entry.id == id) {
            patch.apply_to(entry, &updated_at);
        }
        self.cache.set(RESERVATIONS_KEY, &cached);
        tracing::info!(id, fields = patch.fields().len(), "Reservation updated");
        self.events.emit(BridgeEvent::AdminSynced);

        Ok(Some(canonical))
    }

    /// Delete reservation `id` and drop it from the cache.
    ///
    /// Returns how many cached entries were removed.
    pub async fn delete_reservation(&self, id: &str) -> ClientResult<Option<usize>> {
        let Some(backend) = &self.backend else {
            return Ok(None);
        };

        let query = Query::table(RESERVATIONS_TABLE).eq(ReservationField::Id.column(), id);
        backend.delete(&query).await?;

        let mut cached = self.cached_reservations();
        let before = cached.len();
        cached.retain(|entry| entry.id != id);
        let removed = before - cached.len();
        self.cache.set(RESERVATIONS_KEY, &cached);
        tracing::info!(id, removed, "Reservation deleted");
        self.events.emit(BridgeEvent::AdminSynced);

        Ok(Some(removed))
    }
}
