//! Metadata Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A metadata error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for metadata operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
/// None of them is fatal to a sync run: the [`Resolver`](crate::Resolver)
/// logs them and carries on without metadata.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No API key configured.
    #[display("metadata provider credential is missing")]
    MissingCredential,
    /// The request never produced a response (connection, TLS, timeout).
    #[display("metadata request failed")]
    Request,
    /// The provider answered with a non-success HTTP status.
    #[display("metadata provider responded with HTTP {_0}")]
    Status(#[error(not(source))] u16),
    /// The response body is not what the provider documents.
    #[display("malformed metadata response")]
    InvalidResponse,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request => true,
            Self::Status(status) => *status == 429 || *status >= 500,
            Self::MissingCredential | Self::InvalidResponse => false,
        }
    }
}
