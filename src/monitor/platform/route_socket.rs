//! Routing-socket path listener for Linux, the BSDs and Apple platforms.
//!
//! The kernel announces link, address and route changes on a routing
//! socket (`NETLINK_ROUTE` on Linux, `PF_ROUTE` elsewhere). Every datagram
//! read from the socket becomes one path event; its payload is discarded.

use crate::monitor::{ApiError, PathListener};
use nix::errno::Errno;
use nix::sys::socket::{self, MsgFlags, sockopt};
use nix::sys::time::{TimeVal, TimeValLike};
use std::os::fd::{AsRawFd, OwnedFd};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_stream::Stream;

/// How long a blocked read waits before checking whether the stream is gone.
const READ_TIMEOUT_SECS: i64 = 1;

/// Largest routing message we expect; longer datagrams are truncated,
/// which is harmless since only their arrival matters.
const READ_BUFFER_LEN: usize = 8192;

/// [`PathListener`] backed by a kernel routing socket.
///
/// The socket is opened and subscribed in [`new`](Self::new), so setup
/// failures surface before the monitor starts. Reading happens on a
/// dedicated thread once [`into_stream`](PathListener::into_stream) is called.
///
/// # Example
///
/// ```no_run
/// use ifaddr_monitor::monitor::PathListener;
/// use ifaddr_monitor::monitor::platform::RouteSocketListener;
/// use tokio_stream::StreamExt;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut events = RouteSocketListener::new()?.into_stream();
///
/// while let Some(event) = events.next().await {
///     match event {
///         Ok(()) => println!("network path may have changed"),
///         Err(e) => {
///             eprintln!("listener failed: {e}");
///             break;
///         }
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RouteSocketListener {
    socket: OwnedFd,
}

impl RouteSocketListener {
    /// Opens a routing socket subscribed to interface and route changes.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Os`] if the socket cannot be opened, bound or
    /// configured (e.g., sandboxed processes without netlink access).
    pub fn new() -> Result<Self, ApiError> {
        let socket = open_route_socket()?;
        socket::setsockopt(
            &socket,
            sockopt::ReceiveTimeout,
            &TimeVal::seconds(READ_TIMEOUT_SECS),
        )?;
        Ok(Self { socket })
    }
}

impl PathListener for RouteSocketListener {
    type Stream = RouteSocketStream;

    fn into_stream(self) -> Self::Stream {
        RouteSocketStream::spawn(self.socket)
    }
}

/// Opens a `NETLINK_ROUTE` socket bound to the link, IPv4 address and
/// IPv4 route multicast groups.
#[cfg(any(target_os = "linux", target_os = "android"))]
#[cfg(not(tarpaulin_include))]
fn open_route_socket() -> Result<OwnedFd, ApiError> {
    use nix::sys::socket::{AddressFamily, NetlinkAddr, SockFlag, SockProtocol, SockType};

    let socket = socket::socket(
        AddressFamily::Netlink,
        SockType::Raw,
        SockFlag::SOCK_CLOEXEC,
        SockProtocol::NetlinkRoute,
    )?;

    #[allow(clippy::cast_sign_loss)]
    let groups = (libc::RTMGRP_LINK | libc::RTMGRP_IPV4_IFADDR | libc::RTMGRP_IPV4_ROUTE) as u32;
    socket::bind(socket.as_raw_fd(), &NetlinkAddr::new(0, groups))?;

    Ok(socket)
}

/// Opens a `PF_ROUTE` socket; it receives every routing message by default.
#[cfg(not(any(target_os = "linux", target_os = "android")))]
#[cfg(not(tarpaulin_include))]
fn open_route_socket() -> Result<OwnedFd, ApiError> {
    use nix::sys::socket::{AddressFamily, SockFlag, SockType};

    Ok(socket::socket(
        AddressFamily::Route,
        SockType::Raw,
        SockFlag::empty(),
        None,
    )?)
}

/// Stream of routing-socket events.
///
/// Dropping the stream closes the channel; the reader thread notices
/// within one read timeout, exits and closes the socket.
pub struct RouteSocketStream {
    receiver: UnboundedReceiver<Result<(), ApiError>>,
    terminated: bool,
}

impl std::fmt::Debug for RouteSocketStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteSocketStream")
            .field("terminated", &self.terminated)
            .finish_non_exhaustive()
    }
}

impl RouteSocketStream {
    fn spawn(socket: OwnedFd) -> Self {
        let (tx, receiver) = mpsc::unbounded_channel();
        let reader_tx = tx.clone();

        let spawned = std::thread::Builder::new()
            .name("route-socket".to_string())
            .spawn(move || read_loop(&socket, &reader_tx));

        if let Err(e) = spawned {
            tracing::warn!("Failed to spawn routing socket reader: {e}");
            let _ = tx.send(Err(ApiError::Stopped));
        }

        Self {
            receiver,
            terminated: false,
        }
    }
}

impl Stream for RouteSocketStream {
    type Item = Result<(), ApiError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.terminated {
            return Poll::Ready(None);
        }

        match Pin::new(&mut self.receiver).poll_recv(cx) {
            Poll::Ready(Some(Ok(()))) => Poll::Ready(Some(Ok(()))),
            Poll::Ready(Some(Err(e))) => {
                self.terminated = true;
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                self.terminated = true;
                Poll::Ready(Some(Err(ApiError::Stopped)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// What to do after one read attempt.
#[derive(Debug, PartialEq, Eq)]
enum ReadOutcome {
    /// Forward one path event.
    Event,
    /// Nothing arrived; check whether the consumer is still there.
    Idle,
    /// Report the error and stop reading.
    Fatal(Errno),
}

const fn classify(result: Result<usize, Errno>) -> ReadOutcome {
    match result {
        // ENOBUFS: the receive buffer overran, so messages were lost.
        Ok(_) | Err(Errno::ENOBUFS) => ReadOutcome::Event,
        Err(Errno::EAGAIN | Errno::EINTR) => ReadOutcome::Idle,
        Err(e) => ReadOutcome::Fatal(e),
    }
}

#[cfg(not(tarpaulin_include))]
fn read_loop(socket: &OwnedFd, tx: &UnboundedSender<Result<(), ApiError>>) {
    let mut buf = [0u8; READ_BUFFER_LEN];

    while !tx.is_closed() {
        match classify(socket::recv(socket.as_raw_fd(), &mut buf, MsgFlags::empty())) {
            ReadOutcome::Event => {
                if tx.send(Ok(())).is_err() {
                    break;
                }
            }
            ReadOutcome::Idle => {}
            ReadOutcome::Fatal(e) => {
                let _ = tx.send(Err(ApiError::Os(e)));
                break;
            }
        }
    }

    tracing::trace!("Routing socket reader exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    mod classify {
        use super::*;

        #[test]
        fn datagram_is_event() {
            assert_eq!(classify(Ok(64)), ReadOutcome::Event);
        }

        #[test]
        fn overrun_is_event() {
            assert_eq!(classify(Err(Errno::ENOBUFS)), ReadOutcome::Event);
        }

        #[test]
        fn timeout_and_interrupt_are_idle() {
            assert_eq!(classify(Err(Errno::EAGAIN)), ReadOutcome::Idle);
            assert_eq!(classify(Err(Errno::EINTR)), ReadOutcome::Idle);
        }

        #[test]
        fn other_errors_are_fatal() {
            assert_eq!(classify(Err(Errno::EBADF)), ReadOutcome::Fatal(Errno::EBADF));
        }
    }

    mod stream {
        use super::*;
        use tokio_stream::StreamExt;

        fn stream_with(events: Vec<Result<(), ApiError>>) -> RouteSocketStream {
            let (tx, receiver) = mpsc::unbounded_channel();
            for event in events {
                tx.send(event).unwrap();
            }
            RouteSocketStream {
                receiver,
                terminated: false,
            }
        }

        #[tokio::test]
        async fn forwards_events_then_reports_closed_channel() {
            let mut stream = stream_with(vec![Ok(()), Ok(())]);

            assert!(matches!(stream.next().await, Some(Ok(()))));
            assert!(matches!(stream.next().await, Some(Ok(()))));
            assert!(matches!(stream.next().await, Some(Err(ApiError::Stopped))));
            assert!(stream.next().await.is_none());
        }

        #[tokio::test]
        async fn terminates_after_error() {
            let mut stream = stream_with(vec![Err(ApiError::Os(Errno::EBADF)), Ok(())]);

            assert!(matches!(
                stream.next().await,
                Some(Err(ApiError::Os(Errno::EBADF)))
            ));
            assert!(stream.next().await.is_none());
        }

        #[test]
        fn is_send_and_unpin() {
            fn assert_send<T: Send>() {}
            fn assert_unpin<T: Unpin>() {}
            assert_send::<RouteSocketStream>();
            assert_unpin::<RouteSocketStream>();
        }

        #[test]
        fn debug_shows_state() {
            let stream = stream_with(vec![]);
            assert!(format!("{stream:?}").contains("terminated"));
        }
    }

    // Opening a routing socket needs no privileges, but some sandboxes
    // forbid it; treat that as a skip rather than a failure.
    #[tokio::test]
    async fn real_listener_stream_closes_cleanly() {
        let Ok(listener) = RouteSocketListener::new() else {
            return;
        };
        let stream = listener.into_stream();

        drop(stream);
    }
}
