//! Extraction Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
/// Parsing itself never fails: missing elements yield empty fields, and cards
/// or links that cannot be read are skipped.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The page could not be retrieved (navigation error or timeout).
    #[display("failed to fetch page: {_0}")]
    Fetch(#[error(not(source))] String),
    /// A URL handed to the extractor is not absolute or cannot be joined.
    #[display("invalid URL: {_0}")]
    InvalidUrl(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // The HTML is either there or it's not; only fetching is worth retrying.
        matches!(self, Self::Fetch(_))
    }
}
