//! Reading the catalog site: which series were updated recently, and which
//! episodes a series page links to.
//!
//! Parsing is pure ([`latest_updates`], [`series_page`]); fetching is behind
//! the [`Fetch`] trait so the same extraction runs over a headless browser in
//! production and static HTML in tests. The reconciliation engine only sees
//! the [`PageSource`] trait.

mod consts;
pub mod error;
mod extract;
pub mod models;
mod source;

pub use crate::consts::MAX_CANDIDATES;
pub use crate::extract::{Extractor, episode_hint, first_number};
pub use crate::models::{Candidate, EpisodeLink, SeriesPage};
pub use crate::source::{Fetch, PageSource, Site, SourceHandle};
use tracing::instrument;
use url::Url;

/// Extracts the "latest updates" listing from rendered HTML.
///
/// # Examples
///
/// ```rust
/// use airing_extract::latest_updates;
/// use url::Url;
///
/// let html = r#"
///     <div class="item-drama">
///         <a class="title" href="/drama/moving">Moving</a>
///         <span class="latest-ep">EP 20</span>
///     </div>
/// "#;
/// let base = Url::parse("https://catalog.example").unwrap();
/// let candidates = latest_updates(html, &base);
/// assert_eq!(candidates[0].url, "https://catalog.example/drama/moving");
/// assert_eq!(candidates[0].episode_hint, Some(20));
/// ```
#[instrument(skip_all, fields(html_size = html.len(), base = %base))]
pub fn latest_updates(html: &str, base: &Url) -> Vec<Candidate> {
    Extractor::from_html(html, base).latest_updates()
}

/// Extracts series details and episode links from rendered HTML.
#[instrument(skip_all, fields(html_size = html.len(), base = %base))]
pub fn series_page(html: &str, base: &Url) -> SeriesPage {
    Extractor::from_html(html, base).series_page()
}
