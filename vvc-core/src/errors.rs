//! Error types for `vvc_core`.
//!
//! All failures are funnelled through [`VvError`], which uses `thiserror`
//! for `Display` and `Error` derives.  The facade never lets a raw COM
//! fault escape unannotated: the adapter in `com` maps HRESULTs into one
//! of these variants before they reach a caller.

use thiserror::Error;

/// Top-level error type for the `vvc_core` library.
///
/// Each variant is one failure class of the client/host boundary.
#[derive(Debug, Error)]
pub enum VvError {
    /// No live handle: the host was never attached, or the client was
    /// closed, or the RPC link to the host process died.
    #[error("ConnectivityError: {0}")]
    Connectivity(String),

    /// The host rejected the call or the platform invocation failed.
    /// Carries the host-reported cause when one is available.
    #[error("InvocationError: {operation}: {message}")]
    Invocation {
        /// Host operation name, e.g. `StartTest`.
        operation: String,
        message: String,
    },

    /// Caller-side validation failure: out-of-range channel index, empty
    /// path, wrong value shape.
    #[error("ArgumentError: {0}")]
    Argument(String),

    /// The attached host version does not expose this operation.
    #[error("UnavailableFeatureError: host does not support {operation}")]
    UnavailableFeature {
        /// Host operation name, e.g. `RecordStart`.
        operation: String,
    },
}

impl VvError {
    /// Shorthand for an [`VvError::Invocation`] with an owned operation name.
    pub fn invocation(operation: &str, message: impl Into<String>) -> Self {
        VvError::Invocation {
            operation: operation.to_owned(),
            message: message.into(),
        }
    }

    /// Shorthand for an [`VvError::UnavailableFeature`].
    pub fn unavailable(operation: &str) -> Self {
        VvError::UnavailableFeature {
            operation: operation.to_owned(),
        }
    }
}
