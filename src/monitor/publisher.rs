//! Fan-out of published address sets.
//!
//! The published value lives in a [`tokio::sync::watch`] channel, so a
//! reader always sees one complete [`AddressSet`]: either the previous set
//! or the new one, never a mixture. Callback observers are notified after
//! the value has been replaced.

use crate::network::AddressSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;

/// Callback invoked with every published set.
type Observer = Arc<dyn Fn(&AddressSet) + Send + Sync>;

/// Handle returned by [`Publisher::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

pub(super) struct Publisher {
    current: watch::Sender<AddressSet>,
    observers: Mutex<Vec<(ObserverId, Observer)>>,
    next_id: AtomicU64,
}

impl Publisher {
    pub(super) fn new(initial: AddressSet) -> Self {
        let (current, _) = watch::channel(initial);
        Self {
            current,
            observers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Returns the most recently published set.
    pub(super) fn current(&self) -> AddressSet {
        self.current.borrow().clone()
    }

    /// Returns a receiver that observes every later publish.
    ///
    /// The current value is marked as seen.
    pub(super) fn watch(&self) -> watch::Receiver<AddressSet> {
        self.current.subscribe()
    }

    pub(super) fn subscribe<F>(&self, observer: F) -> ObserverId
    where
        F: Fn(&AddressSet) + Send + Sync + 'static,
    {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock_observers().push((id, Arc::new(observer)));
        id
    }

    pub(super) fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.lock_observers();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    /// Replaces the published value and notifies every observer.
    ///
    /// Every call notifies, even when `set` equals the previous value.
    pub(super) fn publish(&self, set: AddressSet) {
        self.current.send_replace(set.clone());

        // Snapshot so observers may subscribe or unsubscribe from inside a callback.
        let observers: Vec<Observer> = self
            .lock_observers()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        for observer in observers {
            observer(&set);
        }
    }

    fn lock_observers(&self) -> std::sync::MutexGuard<'_, Vec<(ObserverId, Observer)>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("current", &*self.current.borrow())
            .field("observers", &self.lock_observers().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::InterfaceAddress;
    use std::sync::atomic::AtomicUsize;

    fn set(addrs: &[[u8; 4]]) -> AddressSet {
        addrs
            .iter()
            .map(|[a, b, c, d]| InterfaceAddress::new(*a, *b, *c, *d))
            .collect()
    }

    fn counter(publisher: &Publisher) -> (ObserverId, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let observed = Arc::clone(&count);
        let id = publisher.subscribe(move |_| {
            observed.fetch_add(1, Ordering::SeqCst);
        });
        (id, count)
    }

    #[test]
    fn current_returns_initial_value() {
        let publisher = Publisher::new(set(&[[10, 0, 0, 5]]));
        assert_eq!(publisher.current(), set(&[[10, 0, 0, 5]]));
    }

    #[test]
    fn publish_replaces_whole_value() {
        let publisher = Publisher::new(set(&[[10, 0, 0, 5]]));

        publisher.publish(set(&[[10, 0, 0, 5], [10, 0, 0, 6]]));

        assert_eq!(publisher.current(), set(&[[10, 0, 0, 5], [10, 0, 0, 6]]));
    }

    #[test]
    fn observers_see_published_value() {
        let publisher = Publisher::new(AddressSet::empty());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        publisher.subscribe(move |set| {
            sink.lock().unwrap().push(set.clone());
        });

        publisher.publish(set(&[[192, 168, 1, 10]]));

        assert_eq!(*seen.lock().unwrap(), vec![set(&[[192, 168, 1, 10]])]);
    }

    #[test]
    fn unchanged_publish_still_notifies() {
        let publisher = Publisher::new(set(&[[10, 0, 0, 5]]));
        let (_, count) = counter(&publisher);

        publisher.publish(set(&[[10, 0, 0, 5]]));
        publisher.publish(set(&[[10, 0, 0, 5]]));

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let publisher = Publisher::new(AddressSet::empty());
        let (id, count) = counter(&publisher);

        publisher.publish(AddressSet::empty());
        assert!(publisher.unsubscribe(id));
        publisher.publish(AddressSet::empty());

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!publisher.unsubscribe(id), "second unsubscribe is a no-op");
    }

    #[test]
    fn ids_are_unique() {
        let publisher = Publisher::new(AddressSet::empty());
        let (first, _) = counter(&publisher);
        let (second, _) = counter(&publisher);

        assert_ne!(first, second);
    }

    #[test]
    fn observer_may_unsubscribe_itself() {
        let publisher = Arc::new(Publisher::new(AddressSet::empty()));
        let id_slot = Arc::new(Mutex::new(None));
        let calls = Arc::new(AtomicUsize::new(0));

        let weak = Arc::downgrade(&publisher);
        let slot = Arc::clone(&id_slot);
        let observed = Arc::clone(&calls);
        let id = publisher.subscribe(move |_| {
            observed.fetch_add(1, Ordering::SeqCst);
            if let (Some(publisher), Some(id)) = (weak.upgrade(), *slot.lock().unwrap()) {
                publisher.unsubscribe(id);
            }
        });
        *id_slot.lock().unwrap() = Some(id);

        publisher.publish(AddressSet::empty());
        publisher.publish(AddressSet::empty());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn watch_receiver_wakes_on_every_publish() {
        let publisher = Publisher::new(set(&[[10, 0, 0, 5]]));
        let mut rx = publisher.watch();

        assert!(!rx.has_changed().unwrap());

        publisher.publish(set(&[[10, 0, 0, 5]]));

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), set(&[[10, 0, 0, 5]]));
    }
}
