//! State shared between an [`super::AddressMonitor`] and its event task.

use super::publisher::{ObserverId, Publisher};
use crate::network::{AddressSet, Enumerator, InterfaceSource};
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

thread_local! {
    /// Monitors whose observers are running on this thread, innermost last.
    static PUBLISHING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Marks a monitor as running its observers on this thread until dropped.
struct PublishGuard(usize);

impl PublishGuard {
    fn enter(monitor: usize) -> Self {
        PUBLISHING.with_borrow_mut(|monitors| monitors.push(monitor));
        Self(monitor)
    }
}

impl Drop for PublishGuard {
    fn drop(&mut self) {
        PUBLISHING.with_borrow_mut(|monitors| {
            if let Some(pos) = monitors.iter().rposition(|&m| m == self.0) {
                monitors.remove(pos);
            }
        });
    }
}

/// Lifecycle of an address monitor.
///
/// `Active` from construction until teardown; `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Publishing on every refresh.
    Active,
    /// Torn down; refreshes are ignored.
    Stopped,
}

/// What caused a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Trigger {
    /// Construction-time enumeration.
    Initial,
    /// Explicit caller request.
    Caller,
    /// Path-change notification.
    PathEvent,
    /// Fallback poll interval elapsed.
    Poll,
}

impl Trigger {
    /// Returns a human-readable label for logging.
    pub(super) const fn label(self) -> &'static str {
        match self {
            Self::Initial => "initial enumeration",
            Self::Caller => "caller",
            Self::PathEvent => "path event",
            Self::Poll => "fallback poll",
        }
    }
}

#[derive(Debug)]
pub(super) struct Shared<S> {
    enumerator: Enumerator<S>,
    publisher: Publisher,
    /// Held for the whole of a refresh so refreshes never overlap and
    /// teardown waits for an in-flight refresh to finish.
    state: Mutex<MonitorState>,
    polling_only: AtomicBool,
    refreshes: AtomicU64,
}

impl<S: InterfaceSource> Shared<S> {
    /// Enumerates once and builds the shared state around the result.
    pub(super) fn start(enumerator: Enumerator<S>) -> Self {
        let initial = enumerator.enumerate();
        tracing::debug!("Refresh ({}): {initial}", Trigger::Initial.label());

        Self {
            enumerator,
            publisher: Publisher::new(initial),
            state: Mutex::new(MonitorState::Active),
            polling_only: AtomicBool::new(false),
            refreshes: AtomicU64::new(1),
        }
    }

    /// Re-enumerates and publishes the result.
    ///
    /// Returns `false` without enumerating once the monitor is stopped.
    pub(super) fn refresh(&self, trigger: Trigger) -> bool {
        let state = self.lock_state();
        if *state != MonitorState::Active {
            tracing::trace!("Ignoring {} refresh on stopped monitor", trigger.label());
            return false;
        }

        let set = self.enumerator.enumerate();
        tracing::debug!("Refresh ({}): {set}", trigger.label());
        {
            let _publishing = PublishGuard::enter(self.id());
            self.publisher.publish(set);
        }
        self.refreshes.fetch_add(1, Ordering::Relaxed);

        drop(state);
        true
    }
}

impl<S> Shared<S> {
    /// Marks the monitor stopped. Returns `true` if it was active.
    pub(super) fn stop(&self) -> bool {
        let mut state = self.lock_state();
        let was_active = *state == MonitorState::Active;
        *state = MonitorState::Stopped;
        was_active
    }

    pub(super) fn state(&self) -> MonitorState {
        *self.lock_state()
    }

    pub(super) const fn enumerator(&self) -> &Enumerator<S> {
        &self.enumerator
    }

    pub(super) fn current(&self) -> AddressSet {
        self.publisher.current()
    }

    pub(super) fn watch(&self) -> tokio::sync::watch::Receiver<AddressSet> {
        self.publisher.watch()
    }

    pub(super) fn subscribe<F>(&self, observer: F) -> ObserverId
    where
        F: Fn(&AddressSet) + Send + Sync + 'static,
    {
        self.publisher.subscribe(observer)
    }

    pub(super) fn unsubscribe(&self, id: ObserverId) -> bool {
        self.publisher.unsubscribe(id)
    }

    pub(super) fn refreshes(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }

    pub(super) fn is_polling_only(&self) -> bool {
        self.polling_only.load(Ordering::Relaxed)
    }

    pub(super) fn mark_polling_only(&self) {
        self.polling_only.store(true, Ordering::Relaxed);
    }

    fn id(&self) -> usize {
        std::ptr::from_ref(self).addr()
    }

    /// Locks the lifecycle state.
    ///
    /// # Panics
    ///
    /// Panics when called from one of this monitor's own observers: the lock
    /// is already held by the refresh running them, so waiting would hang.
    fn lock_state(&self) -> MutexGuard<'_, MonitorState> {
        let id = self.id();
        assert!(
            !PUBLISHING.with_borrow(|monitors| monitors.contains(&id)),
            "address monitor observer called back into its own monitor"
        );
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
