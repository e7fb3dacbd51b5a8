//! The address monitor and its builder.

use super::driver::{self, WakeStream};
use super::error::MonitorError;
use super::listener::PathListener;
use super::publisher::ObserverId;
use super::state::{MonitorState, Shared, Trigger};
use crate::network::{AddressSet, Enumerator, InterfaceSource};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Configuration for starting an [`AddressMonitor`].
///
/// # Fallback Poll
///
/// Path listeners may miss changes or fail outright. A fallback poll
/// refreshes at a fixed period regardless of events; if the listener fails,
/// the monitor degrades to polling only. Without a poll, a failed listener
/// leaves only explicit [`AddressMonitor::refresh`] calls.
///
/// # Example
///
/// ```no_run
/// use ifaddr_monitor::monitor::{MonitorBuilder, PollOnlyListener};
/// use ifaddr_monitor::network::platform::PlatformSource;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let monitor = MonitorBuilder::new(PlatformSource::new(), PollOnlyListener)
///     .with_fallback_poll(Duration::from_secs(30))
///     .start()?;
///
/// let mut updates = monitor.watch();
/// while updates.changed().await.is_ok() {
///     println!("{}", *updates.borrow_and_update());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MonitorBuilder<S, L> {
    source: S,
    listener: L,
    fallback_poll: Option<Duration>,
}

impl<S, L> MonitorBuilder<S, L>
where
    S: InterfaceSource + 'static,
    L: PathListener,
{
    /// Creates a builder with no fallback poll.
    #[must_use]
    pub const fn new(source: S, listener: L) -> Self {
        Self {
            source,
            listener,
            fallback_poll: None,
        }
    }

    /// Refreshes every `period` in addition to path events.
    ///
    /// The first poll fires one full period after start. A zero period
    /// disables the poll.
    #[must_use]
    pub const fn with_fallback_poll(mut self, period: Duration) -> Self {
        self.fallback_poll = if period.is_zero() { None } else { Some(period) };
        self
    }

    /// Returns the configured fallback poll period, if any.
    #[must_use]
    pub const fn fallback_poll(&self) -> Option<Duration> {
        self.fallback_poll
    }

    /// Enumerates once, publishes the result and starts listening.
    ///
    /// The initial set is available from [`AddressMonitor::current`] as
    /// soon as this returns.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::NoRuntime`] when called outside a Tokio runtime.
    pub fn start(self) -> Result<AddressMonitor<S>, MonitorError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(MonitorError::NoRuntime)?;

        let shared = Arc::new(Shared::start(Enumerator::new(self.source)));
        let wakes = WakeStream::new(self.listener.into_stream(), self.fallback_poll);
        let task = runtime.spawn(driver::run(Arc::downgrade(&shared), wakes));

        tracing::info!(
            "Address monitor started with {} address(es), fallback poll: {}",
            shared.current().len(),
            self.fallback_poll
                .map_or_else(|| "off".to_string(), |p| format!("{}s", p.as_secs()))
        );

        Ok(AddressMonitor { shared, task })
    }
}

/// Publishes the eligible IPv4 addresses of the host's interfaces and keeps
/// them current as the network path changes.
///
/// # Reading
///
/// [`current`](Self::current) returns the latest published set. Sets are
/// replaced whole, so a reader on any thread sees either the old or the new
/// set, never a mixture. [`watch`](Self::watch) and
/// [`subscribe`](Self::subscribe) are notified on every publish, including
/// publishes that did not change the set.
///
/// # Teardown
///
/// [`stop`](Self::stop) (or dropping the monitor) cancels the path
/// subscription. After it returns no further enumeration or publish
/// happens, even if an event was already in flight.
pub struct AddressMonitor<S> {
    shared: Arc<Shared<S>>,
    task: JoinHandle<()>,
}

impl<S> AddressMonitor<S>
where
    S: InterfaceSource + 'static,
{
    /// Starts a monitor with no fallback poll.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::NoRuntime`] when called outside a Tokio runtime.
    pub fn start<L: PathListener>(source: S, listener: L) -> Result<Self, MonitorError> {
        MonitorBuilder::new(source, listener).start()
    }

    /// Re-enumerates and publishes immediately.
    ///
    /// Blocks until the publish completes. Returns `false` (and does
    /// nothing) once the monitor is stopped.
    pub fn refresh(&self) -> bool {
        self.shared.refresh(Trigger::Caller)
    }

    /// Returns the interface source.
    #[must_use]
    pub fn source(&self) -> &S {
        self.shared.enumerator().source()
    }
}

impl<S> AddressMonitor<S> {
    /// Returns the most recently published set.
    #[must_use]
    pub fn current(&self) -> AddressSet {
        self.shared.current()
    }

    /// Returns a receiver that wakes on every later publish.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<AddressSet> {
        self.shared.watch()
    }

    /// Registers a callback run after every publish.
    ///
    /// Callbacks run synchronously on the refreshing thread while the
    /// refresh is in progress; they must not call back into this monitor.
    /// A callback that refreshes, stops or drops its own monitor panics.
    pub fn subscribe<F>(&self, observer: F) -> ObserverId
    where
        F: Fn(&AddressSet) + Send + Sync + 'static,
    {
        self.shared.subscribe(observer)
    }

    /// Removes a callback. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.shared.unsubscribe(id)
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> MonitorState {
        self.shared.state()
    }

    /// Returns true until the monitor is stopped.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state() == MonitorState::Active
    }

    /// Returns true once the path listener has failed or ended.
    #[must_use]
    pub fn is_polling_only(&self) -> bool {
        self.shared.is_polling_only()
    }

    /// Number of publishes so far, the initial one included.
    #[must_use]
    pub fn refresh_count(&self) -> u64 {
        self.shared.refreshes()
    }

    /// Stops the monitor. Idempotent.
    ///
    /// Waits for an in-flight refresh to finish, then cancels the event task,
    /// which drops the listener stream and with it the OS subscription.
    pub fn stop(&self) {
        if self.shared.stop() {
            tracing::info!("Address monitor stopped");
        }
        self.task.abort();
    }
}

impl<S> Drop for AddressMonitor<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<S> fmt::Debug for AddressMonitor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddressMonitor")
            .field("state", &self.state())
            .field("current", &self.current())
            .field("polling_only", &self.is_polling_only())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "address_monitor_tests.rs"]
mod tests;
