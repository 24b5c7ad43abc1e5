//! Builder Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use crate::pipeline::Pipeline;
use derive_more::{Display, Error};

/// A builder error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for builder operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// `Clone` so that a failed memoized fetch can hand the same failure to
/// every caller.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The version or data endpoint could not be reached or understood.
    #[display("remote data service unavailable")]
    RemoteUnavailable,
    /// A collection fetch failed.
    #[display("failed to fetch collection `{_0}`")]
    Fetch(#[error(not(source))] String),
    /// One pipeline failed; its siblings are unaffected.
    #[display("failed to build {_0}")]
    Pipeline(#[error(not(source))] Pipeline),
    /// The fetch worked but produced nothing usable.
    #[display("Failed to load {_0}")]
    EmptyResult(#[error(not(source))] Pipeline),
    /// A rebuild was needed, failed, and there's nothing persisted to fall
    /// back on.
    #[display("game data could not be built and no persisted copy exists")]
    Fatal,
    #[display("unknown stat type: {_0}")]
    UnknownStat(#[error(not(source))] String),
    #[display("failed to parse field '{field}', found value: {value}")]
    ParseError { field: &'static str, value: String },
    #[display("unit {_0} has no role tag to derive a mastery modifier from")]
    MissingRole(#[error(not(source))] String),
    #[display("storage error")]
    Storage,
    #[display("invalid persisted data: {_0}")]
    InvalidData(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RemoteUnavailable | Self::Fetch(_) | Self::Storage)
    }
}
