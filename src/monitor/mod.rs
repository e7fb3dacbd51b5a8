//! Monitor layer keeping the published address set current.
//!
//! This module provides types and functions for:
//! - Publishing and observing address sets ([`AddressMonitor`], [`ObserverId`])
//! - Configuring and starting a monitor ([`MonitorBuilder`])
//! - Path-change notifications ([`PathListener`], [`platform`])
//! - Error handling ([`MonitorError`], [`ApiError`])

mod address_monitor;
mod driver;
mod error;
mod listener;
pub mod platform;
mod publisher;
mod state;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use address_monitor::{AddressMonitor, MonitorBuilder};
pub use error::{ApiError, MonitorError};
pub use listener::{PathListener, PollOnlyListener};
pub use publisher::ObserverId;
pub use state::MonitorState;
