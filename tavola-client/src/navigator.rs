//! Redirect seam for the admin guard

use std::sync::Mutex;

/// Sends the user somewhere else (a login page, typically)
pub trait Navigator: Send + Sync {
    fn redirect(&self, url: &str);
}

/// Navigator that only logs the redirect
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect(&self, url: &str) {
        tracing::info!(url, "Redirect");
    }
}

/// Navigator that records every redirect target
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Redirect targets so far, oldest first
    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, url: &str) {
        if let Ok(mut visited) = self.visited.lock() {
            visited.push(url.to_string());
        }
    }
}
