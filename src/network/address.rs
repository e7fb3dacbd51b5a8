//! Published address types.

use std::fmt;
use std::net::Ipv4Addr;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Serialize, Serializer};

/// An IPv4 address bound to a local interface.
///
/// # Equality
///
/// Two addresses are equal iff their 32 raw bits are equal. No normalization
/// is applied; the octets are kept exactly as the OS reported them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct InterfaceAddress(Ipv4Addr);

impl InterfaceAddress {
    /// Creates an address from its four octets, most significant first.
    #[must_use]
    pub const fn new(a: u8, b: u8, c: u8, d: u8) -> Self {
        Self(Ipv4Addr::new(a, b, c, d))
    }

    /// Returns the four octets in network order.
    #[must_use]
    pub const fn octets(self) -> [u8; 4] {
        self.0.octets()
    }

    /// Returns the raw 32-bit value (big-endian interpretation of the octets).
    #[must_use]
    pub const fn to_bits(self) -> u32 {
        u32::from_be_bytes(self.0.octets())
    }

    /// Returns the address as a standard library [`Ipv4Addr`].
    #[must_use]
    pub const fn ip(self) -> Ipv4Addr {
        self.0
    }
}

impl From<Ipv4Addr> for InterfaceAddress {
    fn from(addr: Ipv4Addr) -> Self {
        Self(addr)
    }
}

impl From<InterfaceAddress> for Ipv4Addr {
    fn from(addr: InterfaceAddress) -> Self {
        addr.0
    }
}

impl fmt::Display for InterfaceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// An immutable, ordered snapshot of eligible addresses.
///
/// Order is the OS enumeration order of the refresh that produced the set.
/// Duplicates are kept as reported. Cloning shares the underlying storage,
/// so replacing a published set never mutates a sequence a reader may hold.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AddressSet(Arc<[InterfaceAddress]>);

impl AddressSet {
    /// Returns an empty set.
    #[must_use]
    pub fn empty() -> Self {
        Self(Arc::from([]))
    }

    /// Returns the addresses as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[InterfaceAddress] {
        &self.0
    }

    /// Returns true if both sets share the same storage.
    #[cfg(test)]
    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for AddressSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl Deref for AddressSet {
    type Target = [InterfaceAddress];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<InterfaceAddress> for AddressSet {
    fn from_iter<I: IntoIterator<Item = InterfaceAddress>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<InterfaceAddress>> for AddressSet {
    fn from(addresses: Vec<InterfaceAddress>) -> Self {
        Self(addresses.into())
    }
}

impl Serialize for AddressSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_slice().serialize(serializer)
    }
}

impl fmt::Debug for AddressSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl fmt::Display for AddressSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, addr) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{addr}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod interface_address {
        use super::*;
        use std::collections::HashSet;

        #[test]
        fn equality_is_over_raw_bits() {
            let a = InterfaceAddress::new(192, 168, 1, 10);
            let b = InterfaceAddress::from("192.168.1.10".parse::<Ipv4Addr>().unwrap());

            assert_eq!(a, b);
            assert_eq!(a.to_bits(), b.to_bits());
            assert_ne!(a, InterfaceAddress::new(192, 168, 1, 11));
        }

        #[test]
        fn hashing_collapses_equal_addresses() {
            let set: HashSet<_> = [
                InterfaceAddress::new(10, 0, 0, 5),
                InterfaceAddress::new(10, 0, 0, 5),
                InterfaceAddress::new(10, 0, 0, 6),
            ]
            .into_iter()
            .collect();

            assert_eq!(set.len(), 2);
        }

        #[test]
        fn to_bits_reads_octets_most_significant_first() {
            let addr = InterfaceAddress::new(10, 0, 0, 5);
            assert_eq!(addr.to_bits(), 0x0A00_0005);
            assert_eq!(addr.octets(), [10, 0, 0, 5]);
        }

        #[test]
        fn displays_as_dotted_quad() {
            assert_eq!(
                InterfaceAddress::new(192, 168, 1, 10).to_string(),
                "192.168.1.10"
            );
        }

        #[test]
        fn serializes_as_string() {
            let json = serde_json::to_string(&InterfaceAddress::new(127, 0, 0, 1)).unwrap();
            assert_eq!(json, r#""127.0.0.1""#);
        }
    }

    mod address_set {
        use super::*;

        fn sample() -> AddressSet {
            vec![
                InterfaceAddress::new(10, 0, 0, 5),
                InterfaceAddress::new(10, 0, 0, 6),
            ]
            .into()
        }

        #[test]
        fn preserves_insertion_order() {
            let set = sample();
            assert_eq!(set[0], InterfaceAddress::new(10, 0, 0, 5));
            assert_eq!(set[1], InterfaceAddress::new(10, 0, 0, 6));
        }

        #[test]
        fn keeps_duplicates() {
            let addr = InterfaceAddress::new(10, 0, 0, 5);
            let set: AddressSet = [addr, addr].into_iter().collect();
            assert_eq!(set.len(), 2);
        }

        #[test]
        fn clone_shares_storage() {
            let set = sample();
            let copy = set.clone();
            assert!(set.ptr_eq(&copy));
        }

        #[test]
        fn equal_contents_compare_equal_without_sharing() {
            let a = sample();
            let b = sample();
            assert_eq!(a, b);
            assert!(!a.ptr_eq(&b));
        }

        #[test]
        fn empty_is_default() {
            assert!(AddressSet::default().is_empty());
            assert_eq!(AddressSet::empty(), AddressSet::default());
        }

        #[test]
        fn display_lists_addresses() {
            assert_eq!(sample().to_string(), "[10.0.0.5, 10.0.0.6]");
            assert_eq!(AddressSet::empty().to_string(), "[]");
        }
    }
}
