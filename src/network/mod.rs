//! Network layer: interface listing and address enumeration.
//!
//! This module provides types and traits for:
//! - Published address values ([`InterfaceAddress`], [`AddressSet`])
//! - Raw OS interface records ([`InterfaceRecord`], [`InterfaceFlags`])
//! - Listing interfaces ([`InterfaceSource`])
//! - Applying the eligibility policy ([`Enumerator`])
//! - Platform-specific implementations ([`platform`])

mod address;
mod enumerator;
pub mod platform;
mod record;
mod source;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use address::{AddressSet, InterfaceAddress};
pub use enumerator::{Enumerator, FORBIDDEN_FLAGS, REQUIRED_FLAGS, eligible_address};
pub use record::{InterfaceFlags, InterfaceRecord, RecordAddress};
pub use source::{FetchError, InterfaceSource};
