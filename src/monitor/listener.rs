//! Path-change listener trait.
//!
//! This module provides the [`PathListener`] trait that abstracts the
//! platform-specific "network path may have changed" notification.

use super::ApiError;
use tokio_stream::Stream;

/// Trait for platform-specific path-change notification APIs.
///
/// Implementations wrap OS mechanisms like routing sockets or
/// `NotifyIpInterfaceChange` and expose them as an async event stream.
///
/// # One-time Semantics
///
/// The `into_stream` method consumes `self`, enforcing one-time use.
/// Dropping the stream cancels the OS subscription.
///
/// # Stream Items
///
/// The stream yields `Result<(), ApiError>`:
/// - `Ok(())` - Reachability may have changed; the payload is deliberately
///   discarded and the caller re-enumerates from scratch
/// - `Err(ApiError)` - The listener failed; callers should degrade to polling
pub trait PathListener: Send {
    /// The stream type returned by `into_stream`.
    type Stream: Stream<Item = Result<(), ApiError>> + Send + Unpin + 'static;

    /// Converts this listener into a notification stream.
    ///
    /// Consumes `self` to enforce one-time semantics.
    fn into_stream(self) -> Self::Stream;
}

/// A listener that never reports an event.
///
/// Used when path-change notifications are disabled or unsupported; the
/// monitor then only refreshes on its fallback poll or on explicit calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct PollOnlyListener;

impl PathListener for PollOnlyListener {
    type Stream = tokio_stream::Pending<Result<(), ApiError>>;

    fn into_stream(self) -> Self::Stream {
        tokio_stream::pending()
    }
}
