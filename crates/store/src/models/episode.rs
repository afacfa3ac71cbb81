use super::{DEFAULT_QUALITY, DEFAULT_SEASON, SeriesId};
use crate::error::{Error, ErrorKind};
use derive_more::{Display, From};
use exn::ResultExt;
use time::UtcDateTime;

/// Surrogate key of a row in the `episodes` table.
#[derive(Debug, Display, From, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EpisodeId(pub i64);

/// One unit of content, owned by exactly one [`Series`](super::Series).
///
/// Episodes are immutable once recorded; rediscovering the same
/// `(series_id, season, number)` triple never overwrites the original row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub id: EpisodeId,
    pub series_id: SeriesId,
    pub tmdb_id: Option<u64>,
    /// Positive, scoped to the owning series.
    pub number: u32,
    pub season: u32,
    pub title: Option<String>,
    pub source_url: String,
    /// Secondary, directly playable resource.
    pub video_url: Option<String>,
    pub quality: String,
    pub added_at: UtcDateTime,
}

/// Attributes of an episode that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEpisode {
    pub series_id: SeriesId,
    pub tmdb_id: Option<u64>,
    pub number: u32,
    pub season: u32,
    pub title: Option<String>,
    pub source_url: String,
    pub video_url: Option<String>,
    pub quality: String,
}
impl NewEpisode {
    /// An episode in the default season with the default quality label.
    pub fn new(series_id: SeriesId, number: u32, source_url: impl Into<String>) -> Self {
        Self {
            series_id,
            tmdb_id: None,
            number,
            season: DEFAULT_SEASON,
            title: None,
            source_url: source_url.into(),
            video_url: None,
            quality: DEFAULT_QUALITY.to_string(),
        }
    }

    pub fn with_season(mut self, season: u32) -> Self {
        self.season = season;
        self
    }

    pub fn with_title(mut self, title: impl Into<Option<String>>) -> Self {
        self.title = title.into();
        self
    }
}

/// Outcome of [`Repository::create_episode`](crate::Repository::create_episode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeInsert {
    Created(EpisodeId),
    /// The `(series, season, episode)` triple was already recorded.
    Duplicate,
}
impl EpisodeInsert {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct EpisodeRow {
    pub(crate) id: i64,
    pub(crate) series_id: i64,
    pub(crate) tmdb_id: Option<i64>,
    pub(crate) episode_number: i64,
    pub(crate) season_number: i64,
    pub(crate) title: Option<String>,
    pub(crate) source_url: String,
    pub(crate) video_url: Option<String>,
    pub(crate) quality: String,
    pub(crate) added_at: i64,
}
impl TryFrom<EpisodeRow> for Episode {
    type Error = Error;
    fn try_from(row: EpisodeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EpisodeId(row.id),
            series_id: SeriesId(row.series_id),
            tmdb_id: row
                .tmdb_id
                .map(|id| u64::try_from(id).or_raise(|| ErrorKind::InvalidData("tmdb id")))
                .transpose()?,
            number: u32::try_from(row.episode_number).or_raise(|| ErrorKind::InvalidData("episode number"))?,
            season: u32::try_from(row.season_number).or_raise(|| ErrorKind::InvalidData("season number"))?,
            title: row.title,
            source_url: row.source_url,
            video_url: row.video_url,
            quality: row.quality,
            added_at: UtcDateTime::from_unix_timestamp(row.added_at)
                .or_raise(|| ErrorKind::InvalidData("discovery date"))?,
        })
    }
}
