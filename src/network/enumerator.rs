//! Interface enumeration and the address eligibility policy.
//!
//! # Eligibility
//!
//! A record contributes its address to the published set only when ALL hold:
//! 1. the interface is up ([`InterfaceFlags::UP`])
//! 2. the interface is running ([`InterfaceFlags::RUNNING`])
//! 3. the interface is simplex ([`InterfaceFlags::SIMPLEX`])
//! 4. the interface is not loopback ([`InterfaceFlags::LOOPBACK`])
//! 5. the record's address is IPv4; other families are skipped silently

use super::{AddressSet, InterfaceAddress, InterfaceFlags, InterfaceRecord, InterfaceSource};

/// Flags that must all be set for a record to be eligible.
pub const REQUIRED_FLAGS: InterfaceFlags = InterfaceFlags::UP
    .union(InterfaceFlags::RUNNING)
    .union(InterfaceFlags::SIMPLEX);

/// Flags that must all be clear for a record to be eligible.
pub const FORBIDDEN_FLAGS: InterfaceFlags = InterfaceFlags::LOOPBACK;

/// Returns the record's IPv4 address if the record passes the eligibility policy.
#[must_use]
pub fn eligible_address(record: &InterfaceRecord) -> Option<InterfaceAddress> {
    if !record.flags.contains(REQUIRED_FLAGS) || record.flags.intersects(FORBIDDEN_FLAGS) {
        return None;
    }

    record
        .address
        .as_ref()
        .and_then(super::RecordAddress::as_v4)
        .map(InterfaceAddress::from)
}

/// Computes the eligible address set from an [`InterfaceSource`].
///
/// Stateless: every call takes a fresh snapshot of the interface list.
///
/// # Example
///
/// ```
/// use ifaddr_monitor::network::{Enumerator, InterfaceFlags, InterfaceRecord};
/// use std::net::Ipv4Addr;
///
/// let up = InterfaceFlags::UP | InterfaceFlags::RUNNING | InterfaceFlags::SIMPLEX;
/// let records = vec![
///     InterfaceRecord::ipv4("en0", up, Ipv4Addr::new(192, 168, 1, 10)),
///     InterfaceRecord::ipv4("lo0", up | InterfaceFlags::LOOPBACK, Ipv4Addr::LOCALHOST),
/// ];
///
/// let enumerator = Enumerator::new(records);
/// assert_eq!(enumerator.enumerate().to_string(), "[192.168.1.10]");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Enumerator<S> {
    source: S,
}

impl<S: InterfaceSource> Enumerator<S> {
    /// Creates an enumerator over the given source.
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Returns the underlying source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Lists the interfaces and returns the eligible IPv4 addresses in OS order.
    ///
    /// A failed query yields an empty set; it is logged, never returned.
    /// The OS list is dropped (released) before this returns.
    pub fn enumerate(&self) -> AddressSet {
        match self.source.list_interfaces() {
            Ok(records) => records
                .filter_map(|record| {
                    let address = eligible_address(&record);
                    if address.is_none() {
                        tracing::trace!(
                            "Skipping {} ({}, {:?})",
                            record.name,
                            record.flags,
                            record.address
                        );
                    }
                    address
                })
                .collect(),
            Err(e) => {
                tracing::warn!("Interface query failed, treating as no addresses: {e}");
                AddressSet::empty()
            }
        }
    }
}

/// A fixed record list is itself a source; convenient for tools and doc examples.
impl InterfaceSource for Vec<InterfaceRecord> {
    type Records = std::vec::IntoIter<InterfaceRecord>;

    fn list_interfaces(&self) -> Result<Self::Records, super::FetchError> {
        Ok(self.clone().into_iter())
    }
}
