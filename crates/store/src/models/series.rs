use crate::error::{Error, ErrorKind};
use derive_more::{Display, From};
use exn::ResultExt;
use time::UtcDateTime;

/// Surrogate key of a row in the `series` table.
#[derive(Debug, Display, From, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesId(pub i64);

/// A tracked show.
///
/// Only `updated_at` changes after creation: it records when the series was
/// last checked against the catalog site, not when it last gained an episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    pub id: SeriesId,
    /// Identifier on the metadata provider (TMDB), unique when present.
    pub tmdb_id: Option<u64>,
    pub title: String,
    pub original_title: Option<String>,
    /// Canonical page of the series on the catalog site, unique when present.
    pub source_url: Option<String>,
    /// ISO 3166-1 country code, e.g. `KR`.
    pub origin_country: Option<String>,
    pub poster_path: Option<String>,
    pub created_at: UtcDateTime,
    pub updated_at: UtcDateTime,
}

/// Attributes of a series that has not been persisted yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewSeries {
    pub tmdb_id: Option<u64>,
    pub title: String,
    pub original_title: Option<String>,
    pub source_url: Option<String>,
    pub origin_country: Option<String>,
    pub poster_path: Option<String>,
}
impl NewSeries {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Default::default() }
    }

    pub fn with_tmdb_id(mut self, tmdb_id: impl Into<Option<u64>>) -> Self {
        self.tmdb_id = tmdb_id.into();
        self
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    pub fn with_origin_country(mut self, country: impl Into<String>) -> Self {
        self.origin_country = Some(country.into());
        self
    }
}

/// Outcome of [`Repository::create_series`](crate::Repository::create_series).
///
/// A collision on either unique key is not an error: the identifier of the
/// row that already occupies the key is returned instead. Callers must not
/// assume an `Existing` row carries the attributes they tried to insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesInsert {
    Created(SeriesId),
    Existing(SeriesId),
}
impl SeriesInsert {
    pub fn id(&self) -> SeriesId {
        match self {
            Self::Created(id) | Self::Existing(id) => *id,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct SeriesRow {
    pub(crate) id: i64,
    pub(crate) tmdb_id: Option<i64>,
    pub(crate) title: String,
    pub(crate) original_title: Option<String>,
    pub(crate) source_url: Option<String>,
    pub(crate) origin_country: Option<String>,
    pub(crate) poster_path: Option<String>,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
}
impl TryFrom<SeriesRow> for Series {
    type Error = Error;
    fn try_from(row: SeriesRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SeriesId(row.id),
            tmdb_id: row
                .tmdb_id
                .map(|id| u64::try_from(id).or_raise(|| ErrorKind::InvalidData("tmdb id")))
                .transpose()?,
            title: row.title,
            original_title: row.original_title,
            source_url: row.source_url,
            origin_country: row.origin_country,
            poster_path: row.poster_path,
            created_at: UtcDateTime::from_unix_timestamp(row.created_at)
                .or_raise(|| ErrorKind::InvalidData("creation date"))?,
            updated_at: UtcDateTime::from_unix_timestamp(row.updated_at)
                .or_raise(|| ErrorKind::InvalidData("update date"))?,
        })
    }
}
