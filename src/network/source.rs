//! Interface listing trait and error types.

use std::sync::Arc;

use super::InterfaceRecord;
use thiserror::Error;

/// Error type for interface listing operations.
///
/// Describes what went wrong without dictating recovery strategy.
/// The enumerator degrades every variant to an empty address set.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Windows API call failed.
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    WindowsApi(#[from] windows::core::Error),

    /// A Unix system call failed.
    #[cfg(unix)]
    #[error("System call failed: {0}")]
    Os(#[from] nix::errno::Errno),

    /// Platform-specific error with a generic message.
    #[error("Platform error: {message}")]
    Platform {
        /// Error message describing the platform-specific failure.
        message: String,
    },
}

/// Capability for listing the OS network interfaces.
///
/// # Design
///
/// - Platform implementations live in [`super::platform`]
/// - Enables dependency injection of fake interface lists for testing
/// - Eligibility filtering is done by the caller, never by the source
///
/// # Resource Lifetime
///
/// The returned [`Self::Records`] iterator owns the OS-allocated list
/// (e.g., the `getifaddrs` buffer). Implementations must release it in
/// `Drop`, so the list is freed on every exit path of the caller, whether
/// the iterator is exhausted, partially consumed, or never touched.
///
/// # Example
///
/// ```ignore
/// use ifaddr_monitor::network::{FetchError, InterfaceRecord, InterfaceSource};
///
/// struct FixedSource(Vec<InterfaceRecord>);
///
/// impl InterfaceSource for FixedSource {
///     type Records = std::vec::IntoIter<InterfaceRecord>;
///
///     fn list_interfaces(&self) -> Result<Self::Records, FetchError> {
///         Ok(self.0.clone().into_iter())
///     }
/// }
/// ```
pub trait InterfaceSource: Send + Sync {
    /// The iterator over one snapshot of the interface list.
    type Records: Iterator<Item = InterfaceRecord>;

    /// Takes a snapshot of all interface records.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the platform query fails.
    ///
    /// # Implementation Notes
    ///
    /// - Return ALL records, including loopback and non-IPv4 ones
    /// - Record order should follow the OS enumeration order
    /// - This is a synchronous operation expected to be a fast local query
    fn list_interfaces(&self) -> Result<Self::Records, FetchError>;
}

impl<S: InterfaceSource + ?Sized> InterfaceSource for Arc<S> {
    type Records = S::Records;

    fn list_interfaces(&self) -> Result<Self::Records, FetchError> {
        (**self).list_interfaces()
    }
}

impl<S: InterfaceSource + ?Sized> InterfaceSource for &S {
    type Records = S::Records;

    fn list_interfaces(&self) -> Result<Self::Records, FetchError> {
        (**self).list_interfaces()
    }
}
