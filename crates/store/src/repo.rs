//! Repository for Series and Episode entities.
//!
//! Every method is a single auto-committed statement (or a short sequence of
//! them). Nothing here holds a transaction across calls, so whatever a sync
//! run committed before a crash stays committed.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{
    Episode, EpisodeId, EpisodeInsert, EpisodeRow, NewEpisode, NewSeries, Series, SeriesId, SeriesInsert, SeriesRow,
    Stats, StatsRow,
};
use exn::{OptionExt, ResultExt};
use sqlx::SqlitePool;
use time::UtcDateTime;
use tracing::instrument;

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error().is_some_and(|e| e.is_unique_violation())
}

fn to_sql_id(id: u64) -> Result<i64> {
    i64::try_from(id).or_raise(|| ErrorKind::InvalidData("tmdb id"))
}

/// Repository for managing Series and Episode rows in the store.
///
/// # Relationships
///
/// - A series owns its episodes; deleting a series cascades to them
/// - An episode is identified by `(series, season, number)`; re-inserting the
///   same triple is reported as [`EpisodeInsert::Duplicate`]
/// - A series is identified by its metadata id and/or its catalog URL;
///   re-inserting either is reported as [`SeriesInsert::Existing`]
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Insert
    // =========================================================================

    /// Insert a new series.
    ///
    /// If a series with the same metadata id is already stored, nothing is
    /// inserted and its id is returned as [`SeriesInsert::Existing`]. Without
    /// a metadata id a new row is always inserted, unless the source URL is
    /// already taken, in which case that row's id is returned instead.
    #[instrument(skip_all, fields(title = %series.title, tmdb_id = ?series.tmdb_id))]
    pub async fn create_series(&self, series: &NewSeries) -> Result<SeriesInsert> {
        if let Some(tmdb_id) = series.tmdb_id
            && let Some(existing) = self.find_series_by_external_id(tmdb_id).await?
        {
            tracing::debug!(series_id = %existing.id, "Series with this metadata id already stored");
            return Ok(SeriesInsert::Existing(existing.id));
        }
        let tmdb_id = series.tmdb_id.map(to_sql_id).transpose()?;
        let now = UtcDateTime::now().unix_timestamp();
        let inserted: sqlx::Result<i64> = sqlx::query_scalar(include_str!("../queries/insert_series.sql"))
            .bind(tmdb_id)
            .bind(&series.title)
            .bind(&series.original_title)
            .bind(&series.source_url)
            .bind(&series.origin_country)
            .bind(&series.poster_path)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await;
        match inserted {
            Ok(id) => Ok(SeriesInsert::Created(SeriesId(id))),
            Err(err) if is_unique_violation(&err) => self.conflicting_series(series).await,
            Err(err) => Err(err).or_raise(|| ErrorKind::Database),
        }
    }

    /// Find the row that made an insert of `series` violate a unique key.
    async fn conflicting_series(&self, series: &NewSeries) -> Result<SeriesInsert> {
        if let Some(tmdb_id) = series.tmdb_id
            && let Some(existing) = self.find_series_by_external_id(tmdb_id).await?
        {
            return Ok(SeriesInsert::Existing(existing.id));
        }
        let existing = match &series.source_url {
            Some(url) => self.find_series_by_source_url(url).await?,
            None => None,
        };
        let existing = existing.ok_or_raise(|| ErrorKind::Constraint)?;
        tracing::debug!(series_id = %existing.id, "Series with this source URL already stored");
        Ok(SeriesInsert::Existing(existing.id))
    }

    /// Insert a new episode.
    ///
    /// Returns [`EpisodeInsert::Duplicate`] (not an error) when the
    /// `(series, season, episode)` triple is already recorded, so retrying
    /// the same insert is harmless.
    #[instrument(skip_all, fields(series_id = %episode.series_id, season = episode.season, episode = episode.number))]
    pub async fn create_episode(&self, episode: &NewEpisode) -> Result<EpisodeInsert> {
        if episode.number == 0 || episode.season == 0 {
            exn::bail!(ErrorKind::InvalidData("episode and season numbers must be positive"));
        }
        let tmdb_id = episode.tmdb_id.map(to_sql_id).transpose()?;
        let inserted: sqlx::Result<i64> = sqlx::query_scalar(include_str!("../queries/insert_episode.sql"))
            .bind(episode.series_id.0)
            .bind(tmdb_id)
            .bind(i64::from(episode.number))
            .bind(i64::from(episode.season))
            .bind(&episode.title)
            .bind(&episode.source_url)
            .bind(&episode.video_url)
            .bind(&episode.quality)
            .bind(UtcDateTime::now().unix_timestamp())
            .fetch_one(&self.pool)
            .await;
        match inserted {
            Ok(id) => Ok(EpisodeInsert::Created(EpisodeId(id))),
            Err(err) if is_unique_violation(&err) => Ok(EpisodeInsert::Duplicate),
            Err(err) => Err(err).or_raise(|| ErrorKind::Database),
        }
    }

    // =========================================================================
    // Get/Fetch
    // =========================================================================

    pub async fn get_series(&self, id: SeriesId) -> Result<Option<Series>> {
        let row: Option<SeriesRow> = sqlx::query_as(include_str!("../queries/get_series.sql"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Series::try_from).transpose()
    }

    /// Get a series by its identifier on the metadata provider.
    pub async fn find_series_by_external_id(&self, tmdb_id: u64) -> Result<Option<Series>> {
        let row: Option<SeriesRow> = sqlx::query_as(include_str!("../queries/get_series_by_tmdb_id.sql"))
            .bind(to_sql_id(tmdb_id)?)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Series::try_from).transpose()
    }

    /// Get a series by its canonical page on the catalog site (exact match).
    pub async fn find_series_by_source_url(&self, url: impl AsRef<str>) -> Result<Option<Series>> {
        let row: Option<SeriesRow> = sqlx::query_as(include_str!("../queries/get_series_by_source_url.sql"))
            .bind(url.as_ref())
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Series::try_from).transpose()
    }

    /// Whether the `(series, season, episode)` triple has been recorded.
    ///
    /// This is the primary deduplication gate; the unique constraint behind
    /// [`create_episode`](Self::create_episode) is only a backstop.
    pub async fn episode_exists(&self, series_id: SeriesId, season: u32, number: u32) -> Result<bool> {
        let exists: i64 = sqlx::query_scalar(include_str!("../queries/episode_exists.sql"))
            .bind(series_id.0)
            .bind(i64::from(season))
            .bind(i64::from(number))
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(exists != 0)
    }

    /// The episode with the highest `(season, number)` of a series.
    pub async fn latest_episode(&self, series_id: SeriesId) -> Result<Option<Episode>> {
        let row: Option<EpisodeRow> = sqlx::query_as(include_str!("../queries/latest_episode.sql"))
            .bind(series_id.0)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Episode::try_from).transpose()
    }

    // =========================================================================
    // Listing
    // =========================================================================

    /// All episodes of a series, ordered by season then episode number.
    pub async fn list_episodes(&self, series_id: SeriesId) -> Result<Vec<Episode>> {
        let rows: Vec<EpisodeRow> = sqlx::query_as(include_str!("../queries/list_episodes.sql"))
            .bind(series_id.0)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Episode::try_from).collect()
    }

    /// All series, most recently checked first.
    pub async fn list_all_series(&self) -> Result<Vec<Series>> {
        let rows: Vec<SeriesRow> = sqlx::query_as(include_str!("../queries/list_all_series.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Series::try_from).collect()
    }

    pub async fn stats(&self) -> Result<Stats> {
        let row: StatsRow = sqlx::query_as(include_str!("../queries/stats.sql"))
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(Stats {
            series: u64::try_from(row.series).or_raise(|| ErrorKind::InvalidData("series count"))?,
            episodes: u64::try_from(row.episodes).or_raise(|| ErrorKind::InvalidData("episode count"))?,
        })
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Mark a series as checked just now.
    ///
    /// Returns `false` if no series has the given id; the caller decides how
    /// loudly to fail.
    pub async fn touch_series(&self, series_id: SeriesId) -> Result<bool> {
        self.touch_series_at(series_id, UtcDateTime::now()).await
    }

    pub(crate) async fn touch_series_at(&self, series_id: SeriesId, at: UtcDateTime) -> Result<bool> {
        let result = sqlx::query(include_str!("../queries/touch_series.sql"))
            .bind(at.unix_timestamp())
            .bind(series_id.0)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
