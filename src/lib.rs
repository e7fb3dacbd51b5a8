//! ifaddr-monitor: live IPv4 interface address monitor
//!
//! A library that enumerates the host's network interfaces, keeps the
//! IPv4 addresses of the usable ones (up, running, simplex, not loopback),
//! and republishes that set whenever the OS reports a network path change.
//!
//! - [`network`]: interface records, the eligibility policy and platform sources
//! - [`monitor`]: the [`monitor::AddressMonitor`] and path-change listeners
//! - [`config`]: CLI and TOML configuration for the `ifaddr-monitor` binary

pub mod config;
pub mod monitor;
pub mod network;
