//! The incremental discovery-and-reconciliation engine.
//!
//! A run reads the catalog site's "latest updates" listing and, candidate by
//! candidate, decides whether the series is new (create it, enriched with
//! metadata when available), already caught up (skip), or possibly behind
//! (read its episode list and record what is missing). Episodes are inserted
//! at most once per `(series, season, number)`.

pub mod error;
mod models;
mod reconcile;

pub use crate::models::{Outcome, RunSummary, SyncOptions};
pub use crate::reconcile::Reconciler;
