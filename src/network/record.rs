//! Raw interface records as reported by the OS.

use bitflags::bitflags;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

bitflags! {
    /// Interface state bits, named independently of any platform's bit layout.
    ///
    /// Platform sources translate their native flags into these constants
    /// symbolically; the enumerator never inspects raw OS bit positions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InterfaceFlags: u8 {
        /// Administratively enabled.
        const UP = 1;
        /// Operationally active (attached and passing traffic).
        const RUNNING = 1 << 1;
        /// Does not receive its own transmissions.
        const SIMPLEX = 1 << 2;
        /// Loopback interface.
        const LOOPBACK = 1 << 3;
    }
}

impl fmt::Display for InterfaceFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "(empty)");
        }
        for (i, (name, _)) in self.iter_names().enumerate() {
            if i > 0 {
                write!(f, "|")?;
            }
            write!(f, "{name}")?;
        }
        Ok(())
    }
}

/// The family-tagged primary address of an interface record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordAddress {
    /// An IPv4 address.
    V4(Ipv4Addr),
    /// An IPv6 address.
    V6(Ipv6Addr),
    /// Any other family (link-layer, etc.), preserving the family code for debugging.
    Other(u16),
}

impl RecordAddress {
    /// Returns the IPv4 address if this is an IPv4 record.
    #[must_use]
    pub const fn as_v4(&self) -> Option<Ipv4Addr> {
        match self {
            Self::V4(addr) => Some(*addr),
            Self::V6(_) | Self::Other(_) => None,
        }
    }
}

/// One entry of the OS interface list.
///
/// Mirrors the traversal unit of `getifaddrs`: an interface with several
/// addresses appears once per address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceRecord {
    /// Interface name (e.g., "en0", "eth0").
    pub name: String,
    /// State bits reported for the interface.
    pub flags: InterfaceFlags,
    /// The record's address, if the OS attached one.
    pub address: Option<RecordAddress>,
}

impl InterfaceRecord {
    /// Creates a new interface record.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        flags: InterfaceFlags,
        address: Option<RecordAddress>,
    ) -> Self {
        Self {
            name: name.into(),
            flags,
            address,
        }
    }

    /// Creates a record carrying an IPv4 address.
    #[must_use]
    pub fn ipv4(name: impl Into<String>, flags: InterfaceFlags, addr: Ipv4Addr) -> Self {
        Self::new(name, flags, Some(RecordAddress::V4(addr)))
    }

    /// Creates a record carrying an IPv6 address.
    #[must_use]
    pub fn ipv6(name: impl Into<String>, flags: InterfaceFlags, addr: Ipv6Addr) -> Self {
        Self::new(name, flags, Some(RecordAddress::V6(addr)))
    }
}
