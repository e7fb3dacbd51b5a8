//! Test fixtures for driving a monitor by hand.

use super::{ApiError, PathListener};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Creates a listener whose events are injected through the returned trigger.
///
/// Dropping the trigger ends the listener's stream.
pub fn manual_listener() -> (ManualTrigger, ManualListener) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ManualTrigger { tx }, ManualListener { rx })
}

/// Sending half of [`manual_listener`].
#[derive(Debug, Clone)]
pub struct ManualTrigger {
    tx: UnboundedSender<Result<(), ApiError>>,
}

impl ManualTrigger {
    /// Emits one path-change event. Returns `false` if the stream is gone.
    pub fn fire(&self) -> bool {
        self.tx.send(Ok(())).is_ok()
    }

    /// Emits a listener failure.
    pub fn fail(&self) {
        let _ = self.tx.send(Err(ApiError::Stopped));
    }

    /// Returns true once the listener's stream has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half of [`manual_listener`].
#[derive(Debug)]
pub struct ManualListener {
    rx: UnboundedReceiver<Result<(), ApiError>>,
}

impl PathListener for ManualListener {
    type Stream = UnboundedReceiverStream<Result<(), ApiError>>;

    fn into_stream(self) -> Self::Stream {
        UnboundedReceiverStream::new(self.rx)
    }
}
