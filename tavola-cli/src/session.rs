//! Session persistence across invocations
//!
//! The signed-in session lives in the bridge cache under [`SESSION_KEY`]
//! so a later `tavola` run can restore it into the REST backend.

use serde_json::Value;
use tavola_client::cache::SESSION_KEY;
use tavola_client::{LocalCache, RestBackend, Session};

const REDACTED: &str = "<redacted>";

/// Save `session` for later runs.
pub fn store(cache: &LocalCache, session: &Session) {
    if !cache.is_persistent() {
        tracing::warn!(
            "Cache is not persistent, the session will be lost when this process exits \
             (set TAVOLA_CACHE_PATH or --cache-path)"
        );
    }
    cache.set(SESSION_KEY, session);
}

/// Load the stored session into `rest`. Returns whether one was found.
pub async fn restore(cache: &LocalCache, rest: &RestBackend) -> bool {
    let stored: Option<Session> = cache.get(SESSION_KEY, None);
    let found = stored.is_some();
    if found {
        tracing::debug!("Restoring stored session");
    }
    rest.set_session(stored).await;
    found
}

pub fn forget(cache: &LocalCache) {
    cache.remove(SESSION_KEY);
}

/// Cache entry for display, with session tokens masked
pub fn redacted_entry(cache: &LocalCache, key: &str) -> Value {
    let mut value: Value = cache.get(key, Value::Null);
    if key == SESSION_KEY
        && let Some(obj) = value.as_object_mut()
    {
        for field in ["access_token", "refresh_token"] {
            if let Some(token) = obj.get_mut(field)
                && !token.is_null()
            {
                *token = Value::from(REDACTED);
            }
        }
    }
    value
}
