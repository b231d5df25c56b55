//! Error types for the shared clipboard service.

use thiserror::Error;

use crate::clipboard::formats::ClipboardFormat;
use crate::clipboard::registry::SessionId;

/// Result type for clipboard service operations
pub type Result<T> = std::result::Result<T, ClipboardError>;

/// Errors returned by the shared clipboard service.
///
/// Every rejection is reported synchronously to the immediate caller; the
/// service never retries on a caller's behalf. The undersized-buffer retry
/// signal is deliberately NOT an error - see
/// [`DataRead::BufferTooSmall`](crate::clipboard::transfer::DataRead).
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// Sharing mode value outside the defined range
    #[error("invalid sharing mode value: {0}")]
    InvalidMode(u32),

    /// Operation disallowed by the current sharing mode
    #[error("transfer direction disabled by sharing mode")]
    ModeViolation,

    /// Requested format is not part of the current offer
    #[error("format {0:?} is not currently offered")]
    FormatUnavailable(ClipboardFormat),

    /// Guest data was requested but no session has announced an offer
    #[error("no guest clipboard offer available")]
    NoOffer,

    /// Response does not match the outstanding request, or offer
    /// ownership has moved to another session in the meantime
    #[error("transfer request is stale")]
    StaleRequest,

    /// Unknown or already disconnected session
    #[error("unknown session {0}")]
    NoSuchSession(SessionId),

    /// A second concurrent message wait on the same session
    #[error("session {0} already has a message wait pending")]
    AlreadyWaiting(SessionId),

    /// Guest payload exceeds the configured maximum
    #[error("payload size {actual} exceeds maximum {max}")]
    PayloadTooLarge {
        /// Actual size in bytes
        actual: usize,
        /// Maximum allowed size in bytes
        max: usize,
    },

    /// Host clipboard backend failure
    #[error("host clipboard backend error: {0}")]
    Backend(String),

    /// Unknown format wire value
    #[error("unknown clipboard format value: {0:#x}")]
    UnknownFormat(u32),
}

impl ClipboardError {
    /// Returns true if the caller may reasonably retry the same call later.
    ///
    /// Stale and racing rejections clear themselves once the other side
    /// makes progress; policy and argument rejections do not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::FormatUnavailable(_) | Self::NoOffer | Self::StaleRequest
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClipboardError::PayloadTooLarge {
            actual: 32,
            max: 16,
        };
        assert_eq!(err.to_string(), "payload size 32 exceeds maximum 16");
    }

    #[test]
    fn test_is_transient() {
        assert!(ClipboardError::NoOffer.is_transient());
        assert!(ClipboardError::StaleRequest.is_transient());
        assert!(!ClipboardError::ModeViolation.is_transient());
        assert!(!ClipboardError::InvalidMode(99).is_transient());
    }
}
