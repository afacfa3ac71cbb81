//! SQLite persistence for tracked series and their episodes.
//!
//! The store is the only stateful part of the system: every sync run reads
//! what was recorded previously and appends what is new.
//!
//! # Architecture
//! Two relations:
//! - **Series**: one row per tracked show, unique on the metadata provider's
//!   identifier and on the catalog page URL (each when present).
//! - **Episodes**: owned by a series and deduplicated on
//!   `(series_id, season_number, episode_number)`.
//!
//! Inserts never fail because a row already exists. Instead they report
//! [`SeriesInsert::Existing`] or [`EpisodeInsert::Duplicate`], so callers can
//! treat "already known" as ordinary control flow.

mod db;
pub mod error;
mod models;
mod repo;

pub use crate::db::Database;
pub use crate::models::{
    DEFAULT_QUALITY, DEFAULT_SEASON, Episode, EpisodeId, EpisodeInsert, NewEpisode, NewSeries, Series, SeriesId,
    SeriesInsert, Stats,
};
pub use crate::repo::Repository;
