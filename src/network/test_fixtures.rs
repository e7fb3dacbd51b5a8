//! Shared fake interface source for enumerator and monitor tests.

use super::{FetchError, InterfaceFlags, InterfaceRecord, InterfaceSource};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Flags of an interface that passes every flag check.
pub const ELIGIBLE: InterfaceFlags = InterfaceFlags::UP
    .union(InterfaceFlags::RUNNING)
    .union(InterfaceFlags::SIMPLEX);

/// Builds an IPv4 record from a dotted-quad string.
pub fn v4(name: &str, flags: InterfaceFlags, addr: &str) -> InterfaceRecord {
    InterfaceRecord::ipv4(name, flags, addr.parse::<Ipv4Addr>().unwrap())
}

/// Builds an IPv6 record.
pub fn v6(name: &str, flags: InterfaceFlags, addr: &str) -> InterfaceRecord {
    InterfaceRecord::ipv6(name, flags, addr.parse::<Ipv6Addr>().unwrap())
}

/// Builds one eligible record per address, named `en0`, `en1`, ...
pub fn eligible(addrs: &[&str]) -> Vec<InterfaceRecord> {
    addrs
        .iter()
        .enumerate()
        .map(|(i, addr)| v4(&format!("en{i}"), ELIGIBLE, addr))
        .collect()
}

/// Fake OS interface layer.
///
/// The interface list can be replaced at any time; every successful query
/// hands out a [`FakeRecords`] whose drop counts as one release of the list.
pub struct FakeSource {
    interfaces: Mutex<Vec<InterfaceRecord>>,
    failure: Mutex<Option<String>>,
    queries: AtomicUsize,
    successes: AtomicUsize,
    releases: Arc<AtomicUsize>,
}

impl FakeSource {
    pub fn new(interfaces: Vec<InterfaceRecord>) -> Self {
        Self {
            interfaces: Mutex::new(interfaces),
            failure: Mutex::new(None),
            queries: AtomicUsize::new(0),
            successes: AtomicUsize::new(0),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(message: &str) -> Self {
        let source = Self::new(vec![]);
        source.fail_with(Some(message));
        source
    }

    pub fn set_interfaces(&self, interfaces: Vec<InterfaceRecord>) {
        *self.interfaces.lock().unwrap() = interfaces;
    }

    pub fn fail_with(&self, message: Option<&str>) {
        *self.failure.lock().unwrap() = message.map(str::to_string);
    }

    /// Total number of `list_interfaces` calls, failed ones included.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Number of calls that handed out a list.
    pub fn successes(&self) -> usize {
        self.successes.load(Ordering::SeqCst)
    }

    /// Number of lists released so far.
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl InterfaceSource for FakeSource {
    type Records = FakeRecords;

    fn list_interfaces(&self) -> Result<Self::Records, FetchError> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(FetchError::Platform { message });
        }

        self.successes.fetch_add(1, Ordering::SeqCst);
        Ok(FakeRecords {
            inner: self.interfaces.lock().unwrap().clone().into_iter(),
            releases: Arc::clone(&self.releases),
        })
    }
}

/// A handed-out interface list; dropping it records a release.
pub struct FakeRecords {
    inner: std::vec::IntoIter<InterfaceRecord>,
    releases: Arc<AtomicUsize>,
}

impl Iterator for FakeRecords {
    type Item = InterfaceRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl Drop for FakeRecords {
    fn drop(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}
