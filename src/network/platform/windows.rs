//! Windows interface listing using `GetAdaptersAddresses`.

use crate::network::{FetchError, InterfaceFlags, InterfaceRecord, InterfaceSource, RecordAddress};
use std::net::{Ipv4Addr, Ipv6Addr};
use windows::Win32::Foundation::WIN32_ERROR;
use windows::Win32::NetworkManagement::IpHelper::{
    GAA_FLAG_SKIP_ANYCAST, GAA_FLAG_SKIP_DNS_SERVER, GAA_FLAG_SKIP_MULTICAST,
    GET_ADAPTERS_ADDRESSES_FLAGS, GetAdaptersAddresses, IF_TYPE_SOFTWARE_LOOPBACK,
    IP_ADAPTER_ADDRESSES_LH,
};
use windows::Win32::NetworkManagement::Ndis::{IF_OPER_STATUS, IfOperStatusUp};
use windows::Win32::Networking::WinSock::{
    AF_INET, AF_INET6, AF_UNSPEC, SOCKADDR, SOCKADDR_IN, SOCKADDR_IN6,
};

/// Buffer size hint for `GetAdaptersAddresses`.
/// The API will tell us the actual required size if this is insufficient.
const INITIAL_BUFFER_SIZE: u32 = 16384;

/// Windows implementation of [`InterfaceSource`] using `GetAdaptersAddresses`.
///
/// Produces one record per unicast address of every adapter, plus one
/// address-less record for adapters without unicast addresses.
///
/// Windows has no simplex flag; every record carries [`InterfaceFlags::SIMPLEX`].
#[derive(Debug, Clone, Default)]
pub struct WindowsSource {
    _private: (),
}

impl WindowsSource {
    /// Creates a new Windows interface source.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl InterfaceSource for WindowsSource {
    type Records = std::vec::IntoIter<InterfaceRecord>;

    fn list_interfaces(&self) -> Result<Self::Records, FetchError> {
        Ok(list_records()?.into_iter())
    }
}

/// Walks the adapter list. The raw buffer is freed when this returns.
fn list_records() -> Result<Vec<InterfaceRecord>, FetchError> {
    let raw_adapters = get_adapter_addresses()?;

    let mut records = Vec::new();
    // SAFETY: GetAdaptersAddresses returns a properly aligned buffer for IP_ADAPTER_ADDRESSES_LH.
    #[allow(clippy::cast_ptr_alignment)]
    let mut current = raw_adapters.as_ptr().cast::<IP_ADAPTER_ADDRESSES_LH>();

    // SAFETY: The linked list is valid as long as `raw_adapters` is alive.
    while !current.is_null() {
        let adapter = unsafe { &*current };
        push_adapter_records(adapter, &mut records);
        current = adapter.Next;
    }

    Ok(records)
}

/// Calls `GetAdaptersAddresses`, growing the buffer once if it was too small.
fn get_adapter_addresses() -> Result<Vec<u8>, FetchError> {
    use windows::Win32::Foundation::{ERROR_BUFFER_OVERFLOW, NO_ERROR};

    let flags = GAA_FLAG_SKIP_ANYCAST | GAA_FLAG_SKIP_MULTICAST | GAA_FLAG_SKIP_DNS_SERVER;
    let mut buffer: Vec<u8> = vec![0u8; INITIAL_BUFFER_SIZE as usize];
    let mut size = INITIAL_BUFFER_SIZE;

    let mut result = call_get_adapters(flags, &mut buffer, &mut size);
    if result == ERROR_BUFFER_OVERFLOW.0 {
        buffer.resize(size as usize, 0);
        result = call_get_adapters(flags, &mut buffer, &mut size);
    }

    if result != NO_ERROR.0 {
        return Err(windows::core::Error::from(WIN32_ERROR(result)).into());
    }

    Ok(buffer)
}

#[cfg(not(tarpaulin_include))]
fn call_get_adapters(
    flags: GET_ADAPTERS_ADDRESSES_FLAGS,
    buffer: &mut [u8],
    size: &mut u32,
) -> u32 {
    // SAFETY: `buffer` is valid for `size` bytes; the API writes at most that
    // much and updates `size` with the required length.
    unsafe {
        GetAdaptersAddresses(
            u32::from(AF_UNSPEC.0),
            flags,
            None,
            Some(buffer.as_mut_ptr().cast()),
            &raw mut *size,
        )
    }
}

/// Appends the records of one adapter. Adapters with unreadable names are skipped.
fn push_adapter_records(adapter: &IP_ADAPTER_ADDRESSES_LH, records: &mut Vec<InterfaceRecord>) {
    // SAFETY: FriendlyName is a valid NUL-terminated wide string owned by the buffer.
    let Ok(name) = (unsafe { adapter.FriendlyName.to_string() }) else {
        return;
    };
    let flags = map_flags(adapter.OperStatus, adapter.IfType);

    let before = records.len();
    let mut unicast = adapter.FirstUnicastAddress;

    // SAFETY: Each unicast entry is valid as long as the parent buffer is alive.
    while !unicast.is_null() {
        let entry = unsafe { &*unicast };
        if let Some(sockaddr) = unsafe { entry.Address.lpSockaddr.as_ref() } {
            records.push(InterfaceRecord::new(
                name.clone(),
                flags,
                Some(map_sockaddr(sockaddr)),
            ));
        }
        unicast = entry.Next;
    }

    if records.len() == before {
        records.push(InterfaceRecord::new(name, flags, None));
    }
}

/// Maps adapter state to [`InterfaceFlags`].
///
/// `OperStatus` is the only state Windows reports, so it drives both
/// the administrative and the operational bit.
fn map_flags(oper_status: IF_OPER_STATUS, if_type: u32) -> InterfaceFlags {
    let up = oper_status == IfOperStatusUp;
    let mut flags = InterfaceFlags::SIMPLEX;
    flags.set(InterfaceFlags::UP | InterfaceFlags::RUNNING, up);
    flags.set(InterfaceFlags::LOOPBACK, if_type == IF_TYPE_SOFTWARE_LOOPBACK);
    flags
}

/// Converts a `SOCKADDR` to a family-tagged address.
#[allow(clippy::cast_ptr_alignment)]
fn map_sockaddr(sockaddr: &SOCKADDR) -> RecordAddress {
    match sockaddr.sa_family {
        f if f == AF_INET => {
            // SAFETY: The family is AF_INET, so the structure is a SOCKADDR_IN.
            let sockaddr_in = unsafe { &*(std::ptr::from_ref(sockaddr).cast::<SOCKADDR_IN>()) };
            // SAFETY: sin_addr holds the IPv4 bytes in network order.
            let octets = unsafe { sockaddr_in.sin_addr.S_un.S_un_b };
            RecordAddress::V4(Ipv4Addr::new(
                octets.s_b1,
                octets.s_b2,
                octets.s_b3,
                octets.s_b4,
            ))
        }
        f if f == AF_INET6 => {
            // SAFETY: The family is AF_INET6, so the structure is a SOCKADDR_IN6.
            let sockaddr_in6 =
                unsafe { &*(std::ptr::from_ref(sockaddr).cast::<SOCKADDR_IN6>()) };
            // SAFETY: The union always holds the 16 address bytes.
            RecordAddress::V6(Ipv6Addr::from(unsafe { sockaddr_in6.sin6_addr.u.Byte }))
        }
        other => RecordAddress::Other(other.0),
    }
}
