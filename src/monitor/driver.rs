//! Background task that turns path events and poll ticks into refreshes.
//!
//! The task holds only a [`Weak`] reference to the monitor state: once the
//! monitor is dropped, the next wake-up finds nothing to refresh and the
//! task ends.

use super::error::ApiError;
use super::state::{Shared, Trigger};
use crate::network::InterfaceSource;
use std::pin::Pin;
use std::sync::Weak;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tokio_stream::{Stream, StreamExt};

/// Internal state of the wake stream.
#[derive(Debug)]
enum ListenerState<E> {
    /// Path events are flowing.
    Listening {
        /// The listener's event stream.
        events: E,
    },
    /// The listener failed or ended; only the fallback poll remains.
    Lost,
}

/// One wake-up of the event task.
#[derive(Debug)]
pub(super) enum Wake {
    /// A refresh is due.
    Refresh(Trigger),
    /// The listener stopped delivering events; `None` when it ended cleanly.
    ListenerLost(Option<ApiError>),
}

/// Merges a listener's event stream with an optional fallback poll.
///
/// Path events are checked first. After the listener is lost the stream
/// continues on the poll alone, or ends if there is no poll.
#[derive(Debug)]
pub(super) struct WakeStream<E> {
    state: ListenerState<E>,
    poll: Option<Interval>,
}

impl<E> WakeStream<E>
where
    E: Stream<Item = Result<(), ApiError>> + Unpin,
{
    /// Creates the stream. The first poll tick fires one full period from now.
    ///
    /// A period whose first deadline does not fit in an [`Instant`] can never
    /// fire, so it disables the poll.
    pub(super) fn new(events: E, fallback_poll: Option<Duration>) -> Self {
        let poll = fallback_poll.and_then(|period| {
            let Some(first) = Instant::now().checked_add(period) else {
                tracing::warn!(
                    "Fallback poll of {}s is out of range, polling disabled",
                    period.as_secs()
                );
                return None;
            };
            let mut poll = interval_at(first, period);
            poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
            Some(poll)
        });

        Self {
            state: ListenerState::Listening { events },
            poll,
        }
    }

    fn poll_interval(&mut self, cx: &mut Context<'_>) -> Poll<Option<Wake>> {
        match &mut self.poll {
            Some(poll) => match poll.poll_tick(cx) {
                Poll::Ready(_) => Poll::Ready(Some(Wake::Refresh(Trigger::Poll))),
                Poll::Pending => Poll::Pending,
            },
            // Listener lost and nothing to poll: nothing can ever wake us.
            None if matches!(self.state, ListenerState::Lost) => Poll::Ready(None),
            None => Poll::Pending,
        }
    }
}

impl<E> Stream for WakeStream<E>
where
    E: Stream<Item = Result<(), ApiError>> + Unpin,
{
    type Item = Wake;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if let ListenerState::Listening { events } = &mut self.state {
            match Pin::new(events).poll_next(cx) {
                Poll::Ready(Some(Ok(()))) => {
                    return Poll::Ready(Some(Wake::Refresh(Trigger::PathEvent)));
                }
                Poll::Ready(Some(Err(e))) => {
                    self.state = ListenerState::Lost;
                    return Poll::Ready(Some(Wake::ListenerLost(Some(e))));
                }
                Poll::Ready(None) => {
                    self.state = ListenerState::Lost;
                    return Poll::Ready(Some(Wake::ListenerLost(None)));
                }
                Poll::Pending => {}
            }
        }

        self.poll_interval(cx)
    }
}

/// Refreshes the monitor if it still exists.
///
/// Returns `false` when the monitor is gone or stopped, telling the task to end.
pub(super) fn deliver<S: InterfaceSource>(shared: &Weak<Shared<S>>, trigger: Trigger) -> bool {
    shared
        .upgrade()
        .is_some_and(|shared| shared.refresh(trigger))
}

/// Runs the event task until the monitor goes away or no wake source remains.
pub(super) async fn run<S, E>(shared: Weak<Shared<S>>, mut wakes: WakeStream<E>)
where
    S: InterfaceSource,
    E: Stream<Item = Result<(), ApiError>> + Unpin,
{
    while let Some(wake) = wakes.next().await {
        match wake {
            Wake::Refresh(trigger) => {
                if !deliver(&shared, trigger) {
                    tracing::debug!("Monitor released, event task exiting");
                    return;
                }
            }
            Wake::ListenerLost(reason) => {
                let Some(shared) = shared.upgrade() else {
                    return;
                };
                shared.mark_polling_only();
                match reason {
                    Some(e) => tracing::warn!("Path listener failed: {e}"),
                    None => tracing::warn!("Path listener ended"),
                }
                if wakes.poll.is_some() {
                    tracing::warn!("Falling back to polling only");
                } else {
                    tracing::warn!("No fallback poll configured; only explicit refreshes remain");
                }
            }
        }
    }
}
