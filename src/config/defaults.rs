//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Default port shown next to each address.
///
/// The port the companion command listener accepts connections on.
pub const PORT: u16 = 31075;

/// Default fallback polling interval in seconds.
pub const POLL_INTERVAL_SECS: u64 = 60;

/// Upper bound for the fallback polling interval in seconds (one week).
pub const MAX_POLL_INTERVAL_SECS: u64 = 7 * 24 * 60 * 60;

/// Default fallback polling interval as Duration.
#[must_use]
pub const fn poll_interval() -> Duration {
    Duration::from_secs(POLL_INTERVAL_SECS)
}
