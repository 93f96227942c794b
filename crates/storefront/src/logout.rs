//! Single-flight latch for forced logout.
//!
//! When several in-flight requests fail with 401 at once, only the first one
//! may clear credentials and redirect. The latch is held from acquisition
//! until the cooldown elapses; acquisitions inside that window fail and the
//! caller skips the logout sequence. Expiry is computed from the acquisition
//! time, so re-arming needs no background task.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// Cooldown-based single-flight latch. Clones share state.
#[derive(Debug, Clone)]
pub struct LogoutLatch {
    cooldown: Duration,
    held_until: Arc<Mutex<Option<Instant>>>,
}

impl LogoutLatch {
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            held_until: Arc::new(Mutex::new(None)),
        }
    }

    /// Take the latch if it is free. Returns `false` while another holder's
    /// cooldown is still running.
    #[must_use]
    pub fn try_acquire(&self) -> bool {
        let now = Instant::now();
        let mut held_until = self
            .held_until
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if held_until.is_some_and(|until| now < until) {
            return false;
        }
        *held_until = Some(now + self.cooldown);
        true
    }

    /// Whether a logout sequence is being handled (the cooldown is running).
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.held_until
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some_and(|until| Instant::now() < until)
    }

    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }
}
