//! Platform-specific interface source implementations.
//!
//! This module provides conditional compilation for platform-specific
//! implementations of the [`InterfaceSource`](super::InterfaceSource) trait.
//!
//! # Platform Support
//!
//! - **Unix** (Linux, macOS, BSD): `getifaddrs` via the `nix` crate.
//! - **Windows**: `GetAdaptersAddresses` via the `windows` crate.

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use unix::{UnixRecords, UnixSource};

#[cfg(windows)]
pub use windows::WindowsSource;

// Re-export platform-specific source as PlatformSource for convenience
#[cfg(unix)]
pub use unix::UnixSource as PlatformSource;

#[cfg(windows)]
pub use windows::WindowsSource as PlatformSource;
