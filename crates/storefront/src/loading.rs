//! In-flight request tracking for the global loading indicator.
//!
//! Every call through the facade holds an [`InFlight`] guard for its whole
//! lifetime. The guard increments the pending count when created and
//! decrements it exactly once when dropped, so success, failure, timeout and
//! a caller dropping the future all settle the count the same way.
//!
//! The loading signal is `pending > 0`. It only changes on the 0→1 and 1→0
//! transitions, and both the count and the signal are updated under one lock
//! so the signal can never disagree with the count.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;

/// Tracks in-flight requests and publishes the derived loading signal.
///
/// Cheap to clone; clones share the count.
#[derive(Debug, Clone)]
pub struct LoadingTracker {
    inner: Arc<LoadingInner>,
}

#[derive(Debug)]
struct LoadingInner {
    pending: Mutex<usize>,
    loading: watch::Sender<bool>,
    listeners: Mutex<HashMap<u64, mpsc::UnboundedSender<bool>>>,
    next_listener: AtomicU64,
}

impl LoadingInner {
    fn adjust(&self, apply: impl FnOnce(usize) -> usize) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        *pending = apply(*pending);
        let is_loading = *pending > 0;
        let changed = self.loading.send_if_modified(|current| {
            if *current == is_loading {
                false
            } else {
                *current = is_loading;
                true
            }
        });
        if changed {
            tracing::debug!(pending = *pending, is_loading, "Loading state changed");
            // Queued while the count is still locked so every listener sees
            // the flips in the order they happened.
            self.listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|_, listener| listener.send(is_loading).is_ok());
        }
    }

    fn remove_listener(&self, id: u64) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }
}

impl Default for LoadingTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingTracker {
    #[must_use]
    pub fn new() -> Self {
        let (loading, _) = watch::channel(false);
        Self {
            inner: Arc::new(LoadingInner {
                pending: Mutex::new(0),
                loading,
                listeners: Mutex::new(HashMap::new()),
                next_listener: AtomicU64::new(0),
            }),
        }
    }

    /// Register a request as in flight until the returned guard is dropped.
    #[must_use = "the request stops counting as in flight when the guard is dropped"]
    pub fn begin(&self) -> InFlight {
        self.inner.adjust(|n| n.saturating_add(1));
        InFlight {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of requests currently in flight.
    #[must_use]
    pub fn pending(&self) -> usize {
        *self
            .inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether any request is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        *self.inner.loading.borrow()
    }

    /// Observe the loading signal.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.loading.subscribe()
    }

    /// Call `callback` with the new value each time the loading signal flips.
    ///
    /// Every 0→1 and →0 transition is delivered, in order, even when a
    /// request starts and settles before the callback gets to run. Callbacks
    /// run on a background task, so they may start requests themselves.
    /// Must be called from within a Tokio runtime.
    pub fn subscribe_to_loading<F>(&self, callback: F) -> LoadingSubscription
    where
        F: Fn(bool) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, tx);

        let task = tokio::spawn(async move {
            while let Some(loading) = rx.recv().await {
                callback(loading);
            }
        });
        LoadingSubscription {
            id,
            tracker: Arc::downgrade(&self.inner),
            task: task.abort_handle(),
        }
    }

    /// Observe the [`LoadingPhase`], which turns `Slow` once loading has
    /// lasted longer than `slow_after`. Must be called from within a Tokio
    /// runtime.
    #[must_use]
    pub fn phase(&self, slow_after: Duration) -> watch::Receiver<LoadingPhase> {
        let loading = self.subscribe();
        let initial = if *loading.borrow() {
            LoadingPhase::Loading
        } else {
            LoadingPhase::Idle
        };
        let (tx, rx) = watch::channel(initial);
        tokio::spawn(drive_phase(loading, tx, slow_after));
        rx
    }
}

/// Marks one request as in flight. Dropping it settles the request.
#[derive(Debug)]
pub struct InFlight {
    inner: Arc<LoadingInner>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.inner.adjust(|n| n.saturating_sub(1));
    }
}

/// Handle for a [`LoadingTracker::subscribe_to_loading`] callback.
///
/// The callback is removed by [`unsubscribe`](Self::unsubscribe) or when the
/// handle is dropped.
#[derive(Debug)]
pub struct LoadingSubscription {
    id: u64,
    tracker: Weak<LoadingInner>,
    task: AbortHandle,
}

impl LoadingSubscription {
    /// Stop delivering loading changes.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for LoadingSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.tracker.upgrade() {
            inner.remove_listener(self.id);
        }
        self.task.abort();
    }
}

/// What the loading indicator should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadingPhase {
    /// Nothing in flight.
    #[default]
    Idle,
    /// Requests in flight.
    Loading,
    /// Requests have been in flight longer than the slow threshold
    /// (the backend is probably waking up).
    Slow,
}

impl LoadingPhase {
    /// Indicator text for this phase.
    #[must_use]
    pub const fn message(self) -> Option<&'static str> {
        match self {
            Self::Idle => None,
            Self::Loading => Some("Loading..."),
            Self::Slow => Some("Waking up server..."),
        }
    }
}

fn publish(tx: &watch::Sender<LoadingPhase>, phase: LoadingPhase) {
    tx.send_if_modified(|current| {
        if *current == phase {
            false
        } else {
            *current = phase;
            true
        }
    });
}

async fn drive_phase(
    loading: watch::Receiver<bool>,
    tx: watch::Sender<LoadingPhase>,
    slow_after: Duration,
) {
    tokio::select! {
        () = tx.closed() => {}
        () = follow_loading(loading, &tx, slow_after) => {}
    }
}

async fn follow_loading(
    mut loading: watch::Receiver<bool>,
    tx: &watch::Sender<LoadingPhase>,
    slow_after: Duration,
) {
    loop {
        if !*loading.borrow_and_update() {
            publish(tx, LoadingPhase::Idle);
            if loading.changed().await.is_err() {
                return;
            }
            continue;
        }

        publish(tx, LoadingPhase::Loading);
        let settled = tokio::time::timeout(slow_after, loading.wait_for(|l| !*l))
            .await
            .map(|result| result.is_ok());
        match settled {
            Ok(true) => {}
            Ok(false) => return,
            Err(_) => {
                publish(tx, LoadingPhase::Slow);
                if loading.wait_for(|l| !*l).await.is_err() {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_pairs_increment_and_decrement() {
        let tracker = LoadingTracker::new();
        assert!(!tracker.is_loading());

        let a = tracker.begin();
        let b = tracker.begin();
        assert_eq!(tracker.pending(), 2);
        assert!(tracker.is_loading());

        drop(a);
        assert!(tracker.is_loading());
        drop(b);
        assert_eq!(tracker.pending(), 0);
        assert!(!tracker.is_loading());
    }

    #[test]
    fn test_signal_only_changes_on_transitions() {
        let tracker = LoadingTracker::new();
        let mut rx = tracker.subscribe();

        let first = tracker.begin();
        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update());

        let second = tracker.begin();
        drop(first);
        assert!(!rx.has_changed().unwrap());

        drop(second);
        assert!(rx.has_changed().unwrap());
        assert!(!*rx.borrow_and_update());
    }

    #[test]
    fn test_out_of_order_settling_reaches_zero() {
        let tracker = LoadingTracker::new();
        let mut guards: Vec<_> = (0..10).map(|_| tracker.begin()).collect();
        // settle in an interleaved order
        while !guards.is_empty() {
            let idx = guards.len() / 2;
            drop(guards.remove(idx));
            assert_eq!(tracker.is_loading(), !guards.is_empty());
        }
        assert_eq!(tracker.pending(), 0);
    }

    #[tokio::test]
    async fn test_callback_subscription() {
        let tracker = LoadingTracker::new();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let subscription = tracker.subscribe_to_loading(move |loading| {
            let _ = tx.send(loading);
        });

        let guard = tracker.begin();
        assert_eq!(rx.recv().await, Some(true));
        drop(guard);
        assert_eq!(rx.recv().await, Some(false));

        subscription.unsubscribe();
        let _guard = tracker.begin();
        // the forwarding task is gone, so the sender side is dropped
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_callback_sees_cycle_that_settles_before_delivery() {
        let tracker = LoadingTracker::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _subscription = tracker.subscribe_to_loading(move |loading| {
            sink.lock().unwrap().push(loading);
        });
        tokio::task::yield_now().await;

        // no await between start and settle
        let guard = tracker.begin();
        drop(guard);
        let guard = tracker.begin();
        drop(guard);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(*seen.lock().unwrap(), vec![true, false, true, false]);
    }

    #[tokio::test]
    async fn test_unsubscribe_removes_listener() {
        let tracker = LoadingTracker::new();
        let first = tracker.subscribe_to_loading(|_| {});
        let _second = tracker.subscribe_to_loading(|_| {});
        assert_eq!(tracker.inner.listeners.lock().unwrap().len(), 2);

        first.unsubscribe();
        assert_eq!(tracker.inner.listeners.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_phase_task_stops_when_receiver_dropped() {
        let tracker = LoadingTracker::new();
        let phase = tracker.phase(Duration::from_secs(2));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(tracker.inner.loading.receiver_count(), 1);

        // idle, so the task is parked waiting for the next request
        drop(phase);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(tracker.inner.loading.receiver_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_phase_turns_slow_after_threshold() {
        let tracker = LoadingTracker::new();
        let mut phase = tracker.phase(Duration::from_secs(2));
        assert_eq!(*phase.borrow(), LoadingPhase::Idle);

        let guard = tracker.begin();
        phase
            .wait_for(|p| *p == LoadingPhase::Loading)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert_eq!(*phase.borrow_and_update(), LoadingPhase::Slow);
        assert_eq!(LoadingPhase::Slow.message(), Some("Waking up server..."));

        drop(guard);
        phase.wait_for(|p| *p == LoadingPhase::Idle).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_phase_fast_request_never_slow() {
        let tracker = LoadingTracker::new();
        let mut phase = tracker.phase(Duration::from_secs(2));

        let guard = tracker.begin();
        phase
            .wait_for(|p| *p == LoadingPhase::Loading)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        drop(guard);
        phase.wait_for(|p| *p == LoadingPhase::Idle).await.unwrap();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(*phase.borrow(), LoadingPhase::Idle);
    }
}
