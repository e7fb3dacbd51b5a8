//! Unix interface listing using `getifaddrs`.

use crate::network::{FetchError, InterfaceFlags, InterfaceRecord, InterfaceSource, RecordAddress};
use nix::ifaddrs::{InterfaceAddress as OsInterfaceAddress, InterfaceAddressIterator, getifaddrs};
use nix::net::if_::InterfaceFlags as OsFlags;
use nix::sys::socket::{SockaddrLike, SockaddrStorage};
use std::fmt;
use std::net::{SocketAddrV4, SocketAddrV6};

/// Unix implementation of [`InterfaceSource`] backed by `getifaddrs(3)`.
///
/// # Example
///
/// ```no_run
/// use ifaddr_monitor::network::{Enumerator, platform::UnixSource};
///
/// let enumerator = Enumerator::new(UnixSource::new());
/// for addr in enumerator.enumerate().iter() {
///     println!("{addr}");
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct UnixSource {
    _private: (),
}

impl UnixSource {
    /// Creates a new Unix interface source.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl InterfaceSource for UnixSource {
    type Records = UnixRecords;

    fn list_interfaces(&self) -> Result<Self::Records, FetchError> {
        Ok(UnixRecords {
            inner: getifaddrs()?,
        })
    }
}

/// Lazy traversal of one `getifaddrs` list.
///
/// The list is freed (`freeifaddrs`) when this iterator is dropped.
pub struct UnixRecords {
    inner: InterfaceAddressIterator,
}

impl Iterator for UnixRecords {
    type Item = InterfaceRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| to_record(&entry))
    }
}

impl fmt::Debug for UnixRecords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnixRecords").finish_non_exhaustive()
    }
}

fn to_record(entry: &OsInterfaceAddress) -> InterfaceRecord {
    InterfaceRecord::new(
        entry.interface_name.clone(),
        map_flags(entry.flags),
        entry.address.as_ref().map(map_address),
    )
}

/// Translates native `IFF_*` bits into [`InterfaceFlags`].
fn map_flags(os: OsFlags) -> InterfaceFlags {
    let mut flags = InterfaceFlags::empty();
    flags.set(InterfaceFlags::UP, os.contains(OsFlags::IFF_UP));
    flags.set(InterfaceFlags::RUNNING, os.contains(OsFlags::IFF_RUNNING));
    flags.set(InterfaceFlags::LOOPBACK, os.contains(OsFlags::IFF_LOOPBACK));
    flags.set(InterfaceFlags::SIMPLEX, is_simplex(os));
    flags
}

#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
))]
fn is_simplex(os: OsFlags) -> bool {
    os.contains(OsFlags::IFF_SIMPLEX)
}

/// Linux and other targets have no `IFF_SIMPLEX`; their interfaces never
/// receive their own transmissions, so they are all reported simplex.
#[cfg(not(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
)))]
const fn is_simplex(_os: OsFlags) -> bool {
    true
}

fn map_address(storage: &SockaddrStorage) -> RecordAddress {
    if let Some(sin) = storage.as_sockaddr_in() {
        return RecordAddress::V4(*SocketAddrV4::from(*sin).ip());
    }
    if let Some(sin6) = storage.as_sockaddr_in6() {
        return RecordAddress::V6(*SocketAddrV6::from(*sin6).ip());
    }

    // SAFETY: `as_ptr` points into `storage`, which outlives this read, and
    // every sockaddr starts with a valid `sa_family` field.
    let family = unsafe { (*storage.as_ptr()).sa_family };
    RecordAddress::Other(u16::from(family))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Enumerator;
    use std::net::Ipv4Addr;

    #[test]
    fn map_flags_translates_each_bit() {
        let flags = map_flags(OsFlags::IFF_UP | OsFlags::IFF_RUNNING | OsFlags::IFF_LOOPBACK);

        assert!(flags.contains(InterfaceFlags::UP));
        assert!(flags.contains(InterfaceFlags::RUNNING));
        assert!(flags.contains(InterfaceFlags::LOOPBACK));
    }

    #[test]
    fn map_flags_leaves_unset_bits_clear() {
        let flags = map_flags(OsFlags::empty());

        assert!(!flags.contains(InterfaceFlags::UP));
        assert!(!flags.contains(InterfaceFlags::RUNNING));
        assert!(!flags.contains(InterfaceFlags::LOOPBACK));
    }

    #[test]
    fn map_address_extracts_ipv4() {
        let storage = SockaddrStorage::from(std::net::SocketAddr::from((
            Ipv4Addr::new(192, 168, 1, 10),
            0,
        )));

        assert_eq!(
            map_address(&storage),
            RecordAddress::V4(Ipv4Addr::new(192, 168, 1, 10))
        );
    }

    #[test]
    fn map_address_extracts_ipv6() {
        let storage = SockaddrStorage::from(std::net::SocketAddr::from((
            std::net::Ipv6Addr::LOCALHOST,
            0,
        )));

        assert_eq!(
            map_address(&storage),
            RecordAddress::V6(std::net::Ipv6Addr::LOCALHOST)
        );
    }

    // Integration test: lists the real interfaces of the host
    #[test]
    fn list_interfaces_includes_loopback() {
        let records: Vec<_> = UnixSource::new().list_interfaces().unwrap().collect();

        assert!(
            records
                .iter()
                .any(|r| r.flags.contains(InterfaceFlags::LOOPBACK)),
            "Expected a loopback record, got: {records:?}"
        );
    }

    #[test]
    fn enumerate_never_publishes_loopback() {
        let addresses = Enumerator::new(UnixSource::new()).enumerate();

        assert!(!addresses.iter().any(|a| a.ip().is_loopback()));
    }
}
