//! Application execution logic.
//!
//! This module contains the main async loop that keeps the address
//! monitor running and prints every newly published set.

use std::io::{self, Write};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::signal;

use ifaddr_monitor::config::{OutputFormat, ValidatedConfig};
use ifaddr_monitor::monitor::{
    AddressMonitor, MonitorBuilder, MonitorError, PathListener, PollOnlyListener,
};
use ifaddr_monitor::network::platform::PlatformSource;
use ifaddr_monitor::network::{AddressSet, Enumerator, InterfaceAddress};

#[cfg(any(
    windows,
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
))]
use ifaddr_monitor::monitor::platform::PlatformListener;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to start the address monitor.
    #[error("Failed to start address monitor: {0}")]
    Monitor(#[from] MonitorError),

    /// Unexpected publish channel closure.
    #[error("Monitor stream terminated unexpectedly")]
    StreamTerminated,

    /// Failed to write to standard output.
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// One printed endpoint in JSON output.
#[derive(Debug, Serialize)]
struct Endpoint {
    address: InterfaceAddress,
    port: u16,
}

/// Formats published sets for the terminal.
#[derive(Debug, Clone, Copy)]
struct Renderer {
    port: u16,
    format: OutputFormat,
}

impl Renderer {
    const fn new(config: &ValidatedConfig) -> Self {
        Self {
            port: config.port,
            format: config.format,
        }
    }

    /// Writes one set.
    ///
    /// Text: one `address:port` line per address, then a blank line ending
    /// the set. JSON: one array of `{address, port}` objects on one line.
    fn write<W: Write>(&self, out: &mut W, set: &AddressSet) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                for address in set.as_slice() {
                    writeln!(out, "{address}:{}", self.port)?;
                }
                writeln!(out)?;
            }
            OutputFormat::Json => {
                let endpoints: Vec<Endpoint> = set
                    .iter()
                    .map(|&address| Endpoint {
                        address,
                        port: self.port,
                    })
                    .collect();
                serde_json::to_writer(&mut *out, &endpoints)?;
                writeln!(out)?;
            }
        }
        out.flush()
    }
}

/// Prints sets, skipping any that equal the last printed one.
#[derive(Debug)]
struct Printer<W> {
    renderer: Renderer,
    out: W,
    last: Option<AddressSet>,
}

impl<W: Write> Printer<W> {
    const fn new(renderer: Renderer, out: W) -> Self {
        Self {
            renderer,
            out,
            last: None,
        }
    }

    /// Prints `set` unless it equals the last printed set. Returns whether it printed.
    fn print(&mut self, set: &AddressSet) -> io::Result<bool> {
        if self.last.as_ref() == Some(set) {
            tracing::debug!("Publish unchanged, not printing: {set}");
            return Ok(false);
        }

        self.renderer.write(&mut self.out, set)?;
        tracing::info!("Addresses: {set}");
        self.last = Some(set.clone());
        Ok(true)
    }
}

/// Prints the current addresses once.
///
/// # Errors
///
/// Returns an error if standard output cannot be written.
#[cfg(not(tarpaulin_include))]
pub fn list(config: &ValidatedConfig) -> Result<(), RunError> {
    let set = Enumerator::new(PlatformSource::new()).enumerate();
    Renderer::new(config).write(&mut io::stdout().lock(), &set)?;
    Ok(())
}

/// Executes the main application loop.
///
/// This function:
/// 1. Starts the address monitor (path events and/or fallback poll per config)
/// 2. Prints the initial set
/// 3. Prints every later publish that differs from the last printed set
/// 4. Stops the monitor on shutdown signal (Ctrl+C / SIGTERM)
///
/// # Errors
///
/// Returns an error if:
/// - The path listener fails to initialize
/// - The publish channel closes unexpectedly
/// - Standard output cannot be written
///
/// # Coverage Note
///
/// This function is excluded from coverage because it requires:
/// - Platform-specific network APIs
/// - Real async runtime with signal handling
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let monitor = if config.poll_only {
        tracing::info!(
            "Polling-only mode enabled (interval: {}s)",
            config.poll_interval.as_secs()
        );
        start_with(PollOnlyListener, config.fallback_poll())?
    } else {
        start_event_monitor(config.fallback_poll())?
    };

    let printer = Printer::new(Renderer::new(&config), io::stdout());
    print_until_shutdown(&monitor, printer, shutdown_signal()).await?;

    monitor.stop();
    Ok(())
}

/// Starts a monitor over the platform interface list.
fn start_with<L: PathListener>(
    listener: L,
    fallback_poll: Option<Duration>,
) -> Result<AddressMonitor<PlatformSource>, MonitorError> {
    let builder = MonitorBuilder::new(PlatformSource::new(), listener);
    match fallback_poll {
        Some(period) => builder.with_fallback_poll(period),
        None => builder,
    }
    .start()
}

/// Starts a monitor driven by the platform path listener.
#[cfg(not(tarpaulin_include))]
#[cfg(any(
    windows,
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
))]
fn start_event_monitor(
    fallback_poll: Option<Duration>,
) -> Result<AddressMonitor<PlatformSource>, MonitorError> {
    let listener = PlatformListener::new()?;

    match fallback_poll {
        Some(period) => tracing::info!(
            "Event mode enabled (path events + polling every {}s)",
            period.as_secs()
        ),
        None => tracing::info!("Event mode enabled (path events only)"),
    }

    start_with(listener, fallback_poll)
}

/// Platforms without a path listener fall back to polling.
#[cfg(not(tarpaulin_include))]
#[cfg(not(any(
    windows,
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
)))]
fn start_event_monitor(
    fallback_poll: Option<Duration>,
) -> Result<AddressMonitor<PlatformSource>, MonitorError> {
    tracing::warn!("Path events not supported on this platform, using polling only");
    start_with(PollOnlyListener, fallback_poll)
}

/// Prints the current set, then every differing publish, until `shutdown` completes.
async fn print_until_shutdown<S, W, F>(
    monitor: &AddressMonitor<S>,
    mut printer: Printer<W>,
    shutdown: F,
) -> Result<(), RunError>
where
    W: Write,
    F: Future<Output = ()>,
{
    let mut updates = monitor.watch();
    let initial = updates.borrow_and_update().clone();
    printer.print(&initial)?;

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                tracing::info!("Shutdown signal received, stopping...");
                return Ok(());
            }

            changed = updates.changed() => {
                if changed.is_err() {
                    return Err(RunError::StreamTerminated);
                }
                let set = updates.borrow_and_update().clone();
                printer.print(&set)?;
            }
        }
    }
}

/// Returns a future that completes when a shutdown signal is received.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
