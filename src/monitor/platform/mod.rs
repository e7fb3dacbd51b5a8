//! Platform-specific path listener implementations.
//!
//! # Platform Support
//!
//! - **Linux / Android**: `NETLINK_ROUTE` socket ([`RouteSocketListener`])
//! - **macOS / iOS / BSD**: `PF_ROUTE` socket ([`RouteSocketListener`])
//! - **Windows**: `NotifyIpInterfaceChange` ([`InterfaceChangeListener`])
//!
//! [`PlatformListener`] names the listener for the build target.

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
))]
mod route_socket;

#[cfg(windows)]
mod windows;

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
))]
pub use route_socket::{
    RouteSocketListener, RouteSocketListener as PlatformListener, RouteSocketStream,
};

#[cfg(windows)]
pub use windows::{
    InterfaceChangeListener, InterfaceChangeListener as PlatformListener, InterfaceChangeStream,
};
