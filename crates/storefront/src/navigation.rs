//! Navigation bridge between the client core and whatever renders views.
//!
//! The core only needs to know where the user currently is, to move them
//! somewhere else without a full reload, and to tell the router layer that
//! the location changed.

use std::sync::{PoisonError, RwLock};

use tokio::sync::broadcast;

const LOCATION_CHANNEL_CAPACITY: usize = 16;

/// Client-side navigation capability.
pub trait Navigator: Send + Sync {
    /// Path of the current view.
    fn current_path(&self) -> String;

    /// Replace the current location with `path` without reloading.
    fn navigate_replacing(&self, path: &str);

    /// Tell router observers that the location changed.
    fn notify_location_changed(&self);
}

/// In-memory location with a broadcast channel for router observers.
#[derive(Debug)]
pub struct MemoryNavigator {
    path: RwLock<String>,
    changes: broadcast::Sender<String>,
}

impl MemoryNavigator {
    /// Navigator starting at `initial_path`.
    #[must_use]
    pub fn new(initial_path: impl Into<String>) -> Self {
        let (changes, _) = broadcast::channel(LOCATION_CHANNEL_CAPACITY);
        Self {
            path: RwLock::new(initial_path.into()),
            changes,
        }
    }

    /// Receive the new path on every location-changed notification.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.changes.subscribe()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.path
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn navigate_replacing(&self, path: &str) {
        tracing::debug!(path, "Navigating");
        *self.path.write().unwrap_or_else(PoisonError::into_inner) = path.to_string();
    }

    fn notify_location_changed(&self) {
        // No subscribers is fine: nothing is rendering.
        let _ = self.changes.send(self.current_path());
    }
}
