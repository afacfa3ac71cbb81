//! Extraction of listings and series pages from rendered catalog HTML.

mod number;

pub use self::number::{episode_hint, first_number};
use crate::consts;
use crate::models::{Candidate, EpisodeLink, SeriesPage};
use scraper::{ElementRef, Html, Selector};
use tracing::instrument;
use url::Url;

/// Collects the text content of an element with whitespace collapsed.
fn text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

#[derive(Debug)]
pub struct Extractor {
    document: Html,
    base: Url,
}
impl Extractor {
    /// Relative links found in the document are resolved against `base`.
    pub fn from_document(document: Html, base: Url) -> Self {
        Self { document, base }
    }

    pub fn from_html(html: &str, base: &Url) -> Self {
        Self::from_document(Html::parse_document(html), base.clone())
    }

    /// Cards of the "latest updates" listing, in page order.
    ///
    /// At most [`MAX_CANDIDATES`](crate::MAX_CANDIDATES) cards are examined.
    /// Cards without a title or a link are skipped.
    #[instrument(level = "debug", skip_all, fields(base = %self.base))]
    pub fn latest_updates(&self) -> Vec<Candidate> {
        let cards: Vec<_> = self.document.select(&consts::CARD_SELECTOR).collect();
        tracing::debug!(cards = cards.len(), "Found cards in the latest updates listing");
        cards
            .into_iter()
            .take(consts::MAX_CANDIDATES)
            .filter_map(|card| self.candidate(card))
            .collect()
    }

    fn candidate(&self, card: ElementRef<'_>) -> Option<Candidate> {
        let title = card.select(&consts::CARD_TITLE_SELECTOR).next().map(text).filter(|t| !t.is_empty());
        let href = card.select(&consts::CARD_LINK_SELECTOR).next().and_then(|a| a.value().attr("href"));
        let (Some(title), Some(href)) = (title, href) else {
            tracing::trace!("Skipping card without a title or link");
            return None;
        };
        let url = self.resolve(href)?;
        let episode_text = Self::first_text(card, &consts::CARD_EPISODE_SELECTOR);
        Some(Candidate {
            title,
            url,
            episode_hint: episode_hint(&episode_text),
            episode_text,
        })
    }

    /// Title, description and episode links of a series page.
    ///
    /// Links are sorted by episode number; links without a number are kept
    /// (after the numbered ones) so callers can decide what to do with them.
    #[instrument(level = "debug", skip_all, fields(base = %self.base))]
    pub fn series_page(&self) -> SeriesPage {
        let root = self.document.root_element();
        let mut episodes: Vec<_> = self
            .document
            .select(&consts::EPISODE_LINK_SELECTOR)
            .filter_map(|link| {
                let url = self.resolve(link.value().attr("href")?)?;
                let label = text(link);
                Some(EpisodeLink { number: first_number(&label), url, label })
            })
            .collect();
        episodes.sort_by_key(|episode| (episode.number.is_none(), episode.number));
        SeriesPage {
            title: Self::first_text(root, &consts::SERIES_TITLE_SELECTOR),
            original_title: Self::first_text(root, &consts::SERIES_ORIGINAL_TITLE_SELECTOR),
            description: Self::first_text(root, &consts::SERIES_DESCRIPTION_SELECTOR),
            episodes,
        }
    }

    fn first_text(scope: ElementRef<'_>, selector: &Selector) -> String {
        scope.select(selector).next().map(text).unwrap_or_default()
    }

    fn resolve(&self, href: &str) -> Option<String> {
        match self.base.join(href) {
            Ok(url) => Some(url.into()),
            Err(error) => {
                tracing::debug!(href, %error, "Skipping unresolvable link");
                None
            },
        }
    }
}
