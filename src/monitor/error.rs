//! Error types for the monitor layer.

use thiserror::Error;

/// Error type for path-change listeners.
///
/// Represents failures in platform-specific event notification APIs.
/// These errors are recoverable by falling back to polling.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Windows API call failed.
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    WindowsApi(#[from] windows::core::Error),

    /// A Unix system call failed (routing socket setup or read).
    #[cfg(unix)]
    #[error("Routing socket error: {0}")]
    Os(#[from] nix::errno::Errno),

    /// The listener stopped unexpectedly.
    ///
    /// This can happen when the underlying event source terminates
    /// without explicit shutdown request.
    #[error("Listener stopped unexpectedly")]
    Stopped,
}

/// Error type for starting an address monitor.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The monitor was started outside of a Tokio runtime.
    #[error("Address monitor requires a Tokio runtime: {0}")]
    NoRuntime(#[source] tokio::runtime::TryCurrentError),

    /// The platform path-change listener could not be created.
    #[error("Failed to create path listener: {0}")]
    Listener(#[from] ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    mod api_error {
        use super::*;

        #[test]
        fn stopped_displays_message() {
            let error = ApiError::Stopped;
            assert_eq!(error.to_string(), "Listener stopped unexpectedly");
        }

        #[cfg(unix)]
        #[test]
        fn os_error_displays_errno() {
            let error: ApiError = nix::errno::Errno::EPERM.into();
            assert!(error.to_string().contains("Routing socket error"));
        }

        #[cfg(windows)]
        #[test]
        fn windows_api_error_preserves_source() {
            use windows::core::{Error as WinError, HRESULT};

            let win_error = WinError::from_hresult(HRESULT(-2_147_024_809)); // E_INVALIDARG
            let api_error: ApiError = win_error.into();

            assert!(api_error.to_string().contains("Windows API error"));
        }
    }

    mod monitor_error {
        use super::*;
        use std::error::Error;

        #[test]
        fn listener_error_preserves_source() {
            let error = MonitorError::from(ApiError::Stopped);

            assert!(error.to_string().contains("Failed to create path listener"));
            assert!(
                error
                    .source()
                    .unwrap()
                    .to_string()
                    .contains("Listener stopped unexpectedly")
            );
        }

        #[test]
        fn no_runtime_outside_tokio() {
            let error = MonitorError::NoRuntime(tokio::runtime::Handle::try_current().unwrap_err());

            assert!(error.to_string().contains("requires a Tokio runtime"));
            assert!(error.source().is_some());
        }
    }
}
