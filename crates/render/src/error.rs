//! Render Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A render error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for render operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("chrome/chromium not detected on your system")]
    ChromeNotFound,
    /// Chrome did not finish within the configured navigation timeout and
    /// was killed.
    #[display("Chrome did not finish within {_0:?}")]
    ChromeTimeout(#[error(not(source))] std::time::Duration),
    /// Chrome exited with a non-zero exit code.
    /// Killed by signal (no exit code at all) is reported as `-1`.
    #[display("Chrome exited with code: {_0}")]
    ChromeFailed(#[error(not(source))] i32),
    /// Chrome exited successfully without printing a document.
    #[display("Chrome returned an empty document")]
    EmptyDocument,
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ChromeTimeout(_) | Self::ChromeFailed(_) | Self::EmptyDocument)
    }
}
