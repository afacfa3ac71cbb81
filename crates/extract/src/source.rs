//! Boundary between the reconciliation engine and the catalog site.

use crate::Extractor;
use crate::error::{ErrorKind, Result};
use crate::models::{Candidate, SeriesPage};
use async_trait::async_trait;
use exn::ResultExt;
use std::sync::Arc;
use tracing::instrument;
use url::Url;

pub type SourceHandle = Arc<dyn PageSource + Send + Sync>;

/// Read access to the catalog site.
///
/// Implementations may fail with [`ErrorKind::Fetch`] when a page cannot be
/// retrieved in time; an empty page is not an error.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// The "latest updates" listing, at most
    /// [`MAX_CANDIDATES`](crate::MAX_CANDIDATES) entries in page order.
    async fn latest_updates(&self) -> Result<Vec<Candidate>>;

    /// The series page at `url`, as returned in [`Candidate::url`].
    async fn series_page(&self, url: &str) -> Result<SeriesPage>;
}

/// Retrieves the fully rendered HTML of a page.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// The catalog site, read through any [`Fetch`] implementation.
#[derive(Debug, Clone)]
pub struct Site<F> {
    base: Url,
    fetcher: F,
}
impl<F: Fetch> Site<F> {
    /// The listing is read from `base`; relative links resolve against it.
    pub fn new(base: Url, fetcher: F) -> Self {
        Self { base, fetcher }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }
}

#[async_trait]
impl<F: Fetch> PageSource for Site<F> {
    #[instrument(skip(self), fields(url = %self.base))]
    async fn latest_updates(&self) -> Result<Vec<Candidate>> {
        let html = self.fetcher.fetch(&self.base).await?;
        let candidates = Extractor::from_html(&html, &self.base).latest_updates();
        tracing::debug!(candidates = candidates.len(), "Extracted latest updates");
        Ok(candidates)
    }

    #[instrument(skip(self))]
    async fn series_page(&self, url: &str) -> Result<SeriesPage> {
        let url = self.base.join(url).or_raise(|| ErrorKind::InvalidUrl(url.to_string()))?;
        let html = self.fetcher.fetch(&url).await?;
        let page = Extractor::from_html(&html, &self.base).series_page();
        tracing::debug!(episodes = page.episodes.len(), "Extracted series page");
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StaticPages {
        pages: HashMap<String, String>,
        requested: Mutex<Vec<String>>,
    }
    impl StaticPages {
        fn with(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }
    }
    #[async_trait]
    impl Fetch for StaticPages {
        async fn fetch(&self, url: &Url) -> Result<String> {
            self.requested.lock().unwrap().push(url.to_string());
            match self.pages.get(url.as_str()) {
                Some(html) => Ok(html.clone()),
                None => exn::bail!(ErrorKind::Fetch(format!("timed out loading {url}"))),
            }
        }
    }

    fn site(pages: StaticPages) -> Site<StaticPages> {
        Site::new(Url::parse("https://catalog.example/").unwrap(), pages)
    }

    #[tokio::test]
    async fn test_latest_updates_reads_base_url() {
        let pages = StaticPages::default().with(
            "https://catalog.example/",
            r#"<div class="list-item"><h3><a href="/drama/moving">Moving</a></h3><span class="episode">Ep 4</span></div>"#,
        );
        let site = site(pages);
        let candidates = site.latest_updates().await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].url, "https://catalog.example/drama/moving");
        assert_eq!(candidates[0].episode_hint, Some(4));
        assert_eq!(*site.fetcher.requested.lock().unwrap(), vec!["https://catalog.example/".to_string()]);
    }

    #[tokio::test]
    async fn test_series_page_resolves_relative_url() {
        let pages = StaticPages::default().with(
            "https://catalog.example/drama/moving",
            r#"<h1 class="title">Moving</h1><div class="episodios"><a href="/drama/moving/ep-1">Ep 1</a></div>"#,
        );
        let page = site(pages).series_page("/drama/moving").await.unwrap();
        assert_eq!(page.title, "Moving");
        assert_eq!(page.episodes.len(), 1);
        assert_eq!(page.episodes[0].number, Some(1));
        assert_eq!(page.episodes[0].url, "https://catalog.example/drama/moving/ep-1");
    }

    #[tokio::test]
    async fn test_fetch_failure_is_propagated() {
        let err = site(StaticPages::default()).series_page("https://catalog.example/drama/gone").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Fetch(_)));
        assert!(err.is_retryable());
    }
}
