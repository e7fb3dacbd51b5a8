//! Windows path listener using `NotifyIpInterfaceChange`.

use crate::monitor::{ApiError, PathListener};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_stream::Stream;
use windows::Win32::Foundation::{HANDLE, NO_ERROR, WIN32_ERROR};
use windows::Win32::NetworkManagement::IpHelper::{
    CancelMibChangeNotify2, MIB_IPINTERFACE_ROW, MIB_NOTIFICATION_TYPE, NotifyIpInterfaceChange,
};
use windows::Win32::Networking::WinSock::AF_INET;

/// [`PathListener`] backed by the IP Helper interface-change notification.
///
/// Subscribes to IPv4 interface changes only, matching the addresses the
/// monitor publishes. Registration happens when the stream is created;
/// a registration failure is reported as the stream's first item.
#[derive(Debug, Default)]
pub struct InterfaceChangeListener {
    _private: (),
}

impl InterfaceChangeListener {
    /// Creates a new listener.
    ///
    /// # Errors
    ///
    /// Never fails; registration errors surface from the stream instead.
    pub const fn new() -> Result<Self, ApiError> {
        Ok(Self { _private: () })
    }
}

impl PathListener for InterfaceChangeListener {
    type Stream = InterfaceChangeStream;

    fn into_stream(self) -> Self::Stream {
        InterfaceChangeStream::new()
    }
}

/// Stream of interface-change notifications.
///
/// Dropping the stream cancels the registration.
pub struct InterfaceChangeStream {
    receiver: UnboundedReceiver<Result<(), ApiError>>,
    /// Cancels the registration in its `Drop`.
    #[allow(dead_code)]
    registration: Option<Registration>,
    terminated: bool,
}

impl std::fmt::Debug for InterfaceChangeStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterfaceChangeStream")
            .field("terminated", &self.terminated)
            .field("registered", &self.registration.is_some())
            .finish_non_exhaustive()
    }
}

impl InterfaceChangeStream {
    fn new() -> Self {
        let (tx, receiver) = mpsc::unbounded_channel();

        let registration = match Registration::register(tx.clone()) {
            Ok(registration) => Some(registration),
            Err(e) => {
                let _ = tx.send(Err(e));
                None
            }
        };

        Self {
            receiver,
            registration,
            terminated: false,
        }
    }
}

impl Stream for InterfaceChangeStream {
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

/// Context handed to the OS callback.
///
/// `UnboundedSender::send` never blocks, so the callback can deliver
/// straight into the async channel from the OS thread pool.
struct CallbackContext {
    sender: UnboundedSender<Result<(), ApiError>>,
}

/// An active `NotifyIpInterfaceChange` registration.
///
/// Cancels the registration on drop, then reclaims the callback context.
struct Registration {
    handle: HANDLE,
    context: *mut CallbackContext,
}

// SAFETY: CancelMibChangeNotify2 may be called from any thread, and the
// context pointer is only dereferenced again after cancellation.
unsafe impl Send for Registration {}

impl Registration {
    #[cfg(not(tarpaulin_include))]
    fn register(sender: UnboundedSender<Result<(), ApiError>>) -> Result<Self, ApiError> {
        let context = Box::into_raw(Box::new(CallbackContext { sender }));
        let mut handle = HANDLE::default();

        // SAFETY: the callback and context outlive the registration; the
        // context is reclaimed only after CancelMibChangeNotify2 in Drop.
        let result = unsafe {
            NotifyIpInterfaceChange(
                AF_INET,
                Some(interface_change_callback),
                Some(context.cast::<std::ffi::c_void>()),
                false,
                &raw mut handle,
            )
        };

        if result != NO_ERROR {
            // SAFETY: registration failed, so the callback will never run.
            drop(unsafe { Box::from_raw(context) });
            return Err(windows::core::Error::from(WIN32_ERROR(result.0)).into());
        }

        Ok(Self { handle, context })
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        // SAFETY: handle came from NotifyIpInterfaceChange and is cancelled once.
        let _ = unsafe { CancelMibChangeNotify2(self.handle) };

        // SAFETY: after cancellation returns no callback is running or will run.
        drop(unsafe { Box::from_raw(self.context) });
    }
}

/// Called by the OS thread pool on every interface change.
#[cfg(not(tarpaulin_include))]
unsafe extern "system" fn interface_change_callback(
    caller_context: *const std::ffi::c_void,
    _row: *const MIB_IPINTERFACE_ROW,
    _notification_type: MIB_NOTIFICATION_TYPE,
) {
    if caller_context.is_null() {
        return;
    }

    // SAFETY: caller_context is the CallbackContext passed at registration,
    // alive until the registration is cancelled.
    let context = unsafe { &*caller_context.cast::<CallbackContext>() };

    // The receiver may already be gone during teardown.
    let _ = context.sender.send(Ok(()));
}
