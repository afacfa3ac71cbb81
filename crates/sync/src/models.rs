use airing_store::{SeriesId, Stats};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Origin country preferred when several metadata records match a title.
    pub preferred_country: String,
    /// Origin recorded for a new series when no metadata record was found.
    pub fallback_country: String,
}
impl Default for SyncOptions {
    fn default() -> Self {
        Self { preferred_country: "KR".to_string(), fallback_country: "KR".to_string() }
    }
}

/// What reconciling a single candidate did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The advertised episode is already recorded; the series page was not
    /// fetched and the series was left untouched.
    CaughtUp { series_id: SeriesId },
    /// The series page was read and merged into the store.
    Merged {
        series_id: SeriesId,
        /// A new series row was inserted for this candidate.
        series_created: bool,
        new_episodes: usize,
    },
}
impl Outcome {
    pub fn series_id(&self) -> SeriesId {
        match self {
            Self::CaughtUp { series_id } | Self::Merged { series_id, .. } => *series_id,
        }
    }

    pub fn new_episodes(&self) -> usize {
        match self {
            Self::CaughtUp { .. } => 0,
            Self::Merged { new_episodes, .. } => *new_episodes,
        }
    }
}

/// Counters of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Entries read from the latest updates listing.
    pub candidates: usize,
    /// Candidates reconciled without error, caught-up ones included.
    pub processed: usize,
    pub caught_up: usize,
    pub failed: usize,
    pub new_series: usize,
    pub new_episodes: usize,
    /// Store totals after the run.
    pub stats: Stats,
}
impl RunSummary {
    pub(crate) fn record(&mut self, outcome: &Outcome) {
        self.processed += 1;
        match outcome {
            Outcome::CaughtUp { .. } => self.caught_up += 1,
            Outcome::Merged { series_created, new_episodes, .. } => {
                self.new_series += usize::from(*series_created);
                self.new_episodes += new_episodes;
            },
        }
    }
}
impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} new episode(s), {} new series; {}/{} candidates processed ({} caught up, {} failed); store: {} series, {} episodes",
            self.new_episodes,
            self.new_series,
            self.processed,
            self.candidates,
            self.caught_up,
            self.failed,
            self.stats.series,
            self.stats.episodes,
        )
    }
}
