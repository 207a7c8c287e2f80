//! Error types for the streaming layer.

use thiserror::Error;

/// Result type alias for unipress operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Failure conditions reported by codecs, streams, and the registry.
///
/// Retryable progress conditions (`Processing`, `BufferFull`) are not
/// errors; they are carried by [`crate::stream::Status`] on the success
/// path. Everything here is terminal for the operation that returned it.
#[derive(Debug, Error)]
pub enum Error {
    /// Destination buffer too small for a one-shot operation.
    ///
    /// `required` is the codec's best lower bound on the capacity needed;
    /// it is advisory and may still prove insufficient.
    #[error("buffer too small: need at least {required} bytes, got {provided}")]
    BufferTooSmall { required: usize, provided: usize },

    /// A caller-supplied argument violated the codec's contract.
    #[error("bad parameter: {0}")]
    BadParam(String),

    /// Memory allocation failed inside a codec.
    #[error("allocation failed: could not allocate {requested_bytes} bytes")]
    AllocationFailed { requested_bytes: usize },

    /// Input data is corrupted or not in the codec's format.
    #[error("corrupted data: {message}")]
    CorruptedData { message: String },

    /// Codec-specific failure that fits no other category.
    #[error("{codec} error: {message}")]
    Codec {
        codec: &'static str,
        message: String,
    },

    /// No codec registered under the requested name.
    #[error("unable to load codec {name:?}")]
    UnableToLoad { name: String },

    /// Operation not supported by this codec or stream.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Stream operation issued in the wrong state.
    #[error("invalid state: expected {expected}, got {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },
}

impl Error {
    /// Create a buffer too small error.
    pub fn buffer_too_small(required: usize, provided: usize) -> Self {
        Error::BufferTooSmall { required, provided }
    }

    /// Create a bad parameter error.
    pub fn bad_param(message: impl Into<String>) -> Self {
        Error::BadParam(message.into())
    }

    /// Create a corrupted data error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Error::CorruptedData {
            message: message.into(),
        }
    }

    /// Create a corrupted data error with offset context.
    pub fn corrupted_at(message: impl Into<String>, offset: usize) -> Self {
        Error::CorruptedData {
            message: format!("{} at offset {}", message.into(), offset),
        }
    }

    /// Create a codec-specific error.
    pub fn codec(codec: &'static str, message: impl Into<String>) -> Self {
        Error::Codec {
            codec,
            message: message.into(),
        }
    }

    /// Create an unable-to-load error.
    pub fn unable_to_load(name: impl Into<String>) -> Self {
        Error::UnableToLoad { name: name.into() }
    }

    /// Create an unsupported-operation error.
    pub fn unsupported(what: impl Into<String>) -> Self {
        Error::Unsupported(what.into())
    }

    /// Check if the error is recoverable by retrying with a larger buffer.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::BufferTooSmall { .. })
    }

    /// Get error category for logging and metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Error::BufferTooSmall { .. } => "buffer_too_small",
            Error::BadParam(_) => "bad_param",
            Error::AllocationFailed { .. } => "allocation_failed",
            Error::CorruptedData { .. } => "corrupted_data",
            Error::Codec { .. } => "codec_error",
            Error::UnableToLoad { .. } => "unable_to_load",
            Error::Unsupported(_) => "unsupported",
            Error::InvalidState { .. } => "invalid_state",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_too_small_display() {
        let err = Error::buffer_too_small(100, 10);
        let msg = err.to_string();
        assert!(msg.contains("100"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn test_corrupted_at_includes_offset() {
        let err = Error::corrupted_at("bad control byte", 42);
        assert!(err.to_string().contains("at offset 42"));
    }

    #[test]
    fn test_recoverable() {
        assert!(Error::buffer_too_small(8, 4).is_recoverable());
        assert!(!Error::corrupted("x").is_recoverable());
        assert!(!Error::unable_to_load("nope").is_recoverable());
    }

    #[test]
    fn test_categories_are_distinct() {
        let errors = [
            Error::buffer_too_small(1, 0),
            Error::bad_param("p"),
            Error::AllocationFailed { requested_bytes: 1 },
            Error::corrupted("c"),
            Error::codec("copy", "m"),
            Error::unable_to_load("n"),
            Error::unsupported("u"),
            Error::InvalidState {
                expected: "idle",
                actual: "done",
            },
        ];
        let mut categories: Vec<_> = errors.iter().map(|e| e.category()).collect();
        categories.sort_unstable();
        categories.dedup();
        assert_eq!(categories.len(), errors.len());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
