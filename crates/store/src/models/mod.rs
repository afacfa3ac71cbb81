mod episode;
mod series;

pub(crate) use self::episode::EpisodeRow;
pub(crate) use self::series::SeriesRow;
pub use self::episode::{Episode, EpisodeId, EpisodeInsert, NewEpisode};
pub use self::series::{NewSeries, Series, SeriesId, SeriesInsert};

/// Season number written when the source site does not distinguish seasons.
pub const DEFAULT_SEASON: u32 = 1;
/// Quality label recorded when the source site does not advertise one.
pub const DEFAULT_QUALITY: &str = "auto";

/// Cumulative row counts across the whole store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub series: u64,
    pub episodes: u64,
}

#[derive(sqlx::FromRow)]
pub(crate) struct StatsRow {
    pub(crate) series: i64,
    pub(crate) episodes: i64,
}
