//! Remote Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A remote service error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for remote operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The service could not be reached (connection, DNS, timeout).
    #[display("remote service unavailable: {_0}")]
    Unavailable(#[error(not(source))] String),
    /// Credentials were missing or rejected.
    #[display("authentication failed: {_0}")]
    Authentication(#[error(not(source))] String),
    /// The service answered the query with an error.
    #[display("query for collection `{collection}` rejected: {reason}")]
    Rejected { collection: String, reason: String },
    /// The service answered, but not with something we can parse.
    #[display("malformed response: {_0}")]
    Malformed(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
