//! Bridge configuration

use std::path::PathBuf;

/// Default remote procedure that answers "is the caller an admin"
pub const DEFAULT_ADMIN_RPC: &str = "is_admin";

/// Default login page for the admin guard
pub const DEFAULT_LOGIN_URL: &str = "/login.html";

/// Bridge configuration
///
/// The backend is optional: without both `backend_url` and `anon_key` the
/// bridge is built inert and every operation returns `Ok(None)`.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Backend base URL (e.g., "https://xyz.supabase.co")
    pub backend_url: Option<String>,

    /// Public (anon) API key sent as `apikey`
    pub anon_key: Option<String>,

    /// redb file for the local cache (None = in-memory)
    pub cache_path: Option<PathBuf>,

    /// Remote procedure used by the admin guard
    pub admin_rpc: String,

    /// Where the admin guard redirects unauthorized callers
    pub login_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Capacity of the event broadcast channel
    pub event_capacity: usize,
}

impl BridgeConfig {
    /// Create a configuration pointing at a backend
    pub fn new(backend_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            backend_url: Some(backend_url.into()),
            anon_key: Some(anon_key.into()),
            ..Self::default()
        }
    }

    /// Configuration with no backend (inert bridge)
    pub fn offline() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `TAVOLA_BACKEND_URL` | none |
    /// | `TAVOLA_ANON_KEY` | none |
    /// | `TAVOLA_CACHE_PATH` | in-memory |
    /// | `TAVOLA_ADMIN_RPC` | `is_admin` |
    /// | `TAVOLA_LOGIN_URL` | `/login.html` |
    /// | `TAVOLA_TIMEOUT_SECS` | 30 |
    /// | `TAVOLA_EVENT_CAPACITY` | 64 |
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|s| !s.trim().is_empty());
        let defaults = Self::default();

        Self {
            backend_url: var("TAVOLA_BACKEND_URL"),
            anon_key: var("TAVOLA_ANON_KEY"),
            cache_path: var("TAVOLA_CACHE_PATH").map(PathBuf::from),
            admin_rpc: var("TAVOLA_ADMIN_RPC").unwrap_or(defaults.admin_rpc),
            login_url: var("TAVOLA_LOGIN_URL").unwrap_or(defaults.login_url),
            timeout: var("TAVOLA_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout),
            event_capacity: var("TAVOLA_EVENT_CAPACITY")
                .and_then(|v| v.parse().ok())
                .filter(|c: &usize| *c > 0)
                .unwrap_or(defaults.event_capacity),
        }
    }

    /// Whether both backend URL and key are set
    pub fn has_backend(&self) -> bool {
        self.backend_url.is_some() && self.anon_key.is_some()
    }

    /// Set the cache file
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Set the admin remote procedure name
    pub fn with_admin_rpc(mut self, name: impl Into<String>) -> Self {
        self.admin_rpc = name.into();
        self
    }

    /// Set the login page URL
    pub fn with_login_url(mut self, url: impl Into<String>) -> Self {
        self.login_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the event channel capacity
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            anon_key: None,
            cache_path: None,
            admin_rpc: DEFAULT_ADMIN_RPC.to_string(),
            login_url: DEFAULT_LOGIN_URL.to_string(),
            timeout: 30,
            event_capacity: 64,
        }
    }
}
