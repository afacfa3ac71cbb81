mod candidate;
mod series;

pub use self::candidate::Candidate;
pub use self::series::{EpisodeLink, SeriesPage};
