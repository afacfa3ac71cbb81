//! Sync Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use airing_store::SeriesId;
use derive_more::{Display, Error};

/// A sync error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a sync failure.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A query against the [store](airing_store::Repository) failed. Fatal to
    /// the whole run.
    #[display("store operation failed")]
    Store,
    /// The catalog site could not be read for one candidate.
    #[display("failed to read the catalog site")]
    Source,
    /// A series disappeared from the store while it was being reconciled.
    #[display("series {_0} no longer exists")]
    MissingSeries(#[error(not(source))] SeriesId),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store | Self::Source)
    }

    /// Returns `true` if the run cannot continue with the next candidate.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Store)
    }
}
