//! Error types for catalog loading.

use thiserror::Error;

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Errors a catalog loader can report.
///
/// Every variant reduces to one or more human-readable messages via
/// [`crate::presenter::reduce_errors`]; none is fatal to the host.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The requested object type is not describable.
    #[error("unknown object type: {name}")]
    UnknownObject { name: String },

    /// The metadata service rejected the request with one or more
    /// page-level error messages.
    #[error("metadata service error")]
    Service { messages: Vec<String> },

    /// Transport-level failure.
    #[error("request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    /// The service responded but the payload did not decode.
    #[error("undecodable field payload: {0}")]
    Decode(#[from] serde_json::Error),
}
