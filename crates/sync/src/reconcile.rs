use crate::error::{ErrorKind, Result};
use crate::models::{Outcome, RunSummary, SyncOptions};
use airing_extract::{Candidate, EpisodeLink, MAX_CANDIDATES, SourceHandle};
use airing_metadata::Resolver;
use airing_store::{DEFAULT_SEASON, EpisodeInsert, NewEpisode, NewSeries, Repository, SeriesId, SeriesInsert};
use exn::ResultExt;
use tracing::instrument;

/// Brings the store up to date with the catalog site's latest updates.
///
/// Holds no state between runs; everything it knows comes from the
/// [`Repository`]. Every collaborator is passed in, so tests can use an
/// in-memory store and fake sources.
pub struct Reconciler {
    repository: Repository,
    source: SourceHandle,
    resolver: Resolver,
    options: SyncOptions,
}
impl Reconciler {
    pub fn new(repository: Repository, source: SourceHandle, resolver: Resolver, options: SyncOptions) -> Self {
        Self { repository, source, resolver, options }
    }

    /// Reconciles every candidate of the latest updates listing, one after
    /// the other.
    ///
    /// A candidate that fails is logged and counted; the run continues with
    /// the next one. Only a store failure aborts the run, since nothing after
    /// it could be recorded either. A listing that cannot be fetched yields
    /// an empty run.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<RunSummary> {
        let mut candidates = match self.source.latest_updates().await {
            Ok(candidates) => candidates,
            Err(error) => {
                tracing::warn!(error = ?error, "Could not read the latest updates; nothing to reconcile");
                Vec::new()
            },
        };
        candidates.truncate(MAX_CANDIDATES);
        tracing::info!(candidates = candidates.len(), "Reconciling latest updates");

        let mut summary = RunSummary { candidates: candidates.len(), ..RunSummary::default() };
        for candidate in &candidates {
            match self.reconcile(candidate).await {
                Ok(outcome) => summary.record(&outcome),
                Err(error) if error.is_fatal() => return Err(error),
                Err(error) => {
                    tracing::error!(title = %candidate.title, url = %candidate.url, error = ?error, "Failed to reconcile candidate");
                    summary.failed += 1;
                },
            }
        }
        summary.stats = self.repository.stats().await.or_raise(|| ErrorKind::Store)?;
        tracing::info!(
            candidates = summary.candidates,
            processed = summary.processed,
            caught_up = summary.caught_up,
            failed = summary.failed,
            new_series = summary.new_series,
            new_episodes = summary.new_episodes,
            total_series = summary.stats.series,
            total_episodes = summary.stats.episodes,
            "Run complete"
        );
        Ok(summary)
    }

    /// Reconciles a single listing entry.
    ///
    /// 1. Look the series up by its page URL, creating it (with metadata when
    ///    available) on first sight.
    /// 2. If the episode advertised on the card is already recorded, stop:
    ///    the series is caught up.
    /// 3. Otherwise read the series page and record every episode not yet
    ///    stored, in ascending order.
    /// 4. Mark the series as checked.
    #[instrument(skip_all, fields(title = %candidate.title, url = %candidate.url, series_id))]
    pub async fn reconcile(&self, candidate: &Candidate) -> Result<Outcome> {
        let existing = self.repository.find_series_by_source_url(&candidate.url).await.or_raise(|| ErrorKind::Store)?;
        let (series_id, series_created) = match existing {
            Some(series) => {
                let hint = candidate.episode_hint.filter(|number| *number > 0);
                if let Some(hint) = hint
                    && self.repository.episode_exists(series.id, DEFAULT_SEASON, hint).await.or_raise(|| ErrorKind::Store)?
                {
                    tracing::Span::current().record("series_id", series.id.0);
                    tracing::debug!(episode = hint, "Latest episode already recorded; skipping");
                    return Ok(Outcome::CaughtUp { series_id: series.id });
                }
                (series.id, false)
            },
            None => {
                let insert = self.create_series(candidate).await?;
                (insert.id(), insert.is_created())
            },
        };
        tracing::Span::current().record("series_id", series_id.0);

        let page = self.source.series_page(&candidate.url).await.or_raise(|| ErrorKind::Source)?;
        let new_episodes = self.merge_episodes(series_id, page.episodes).await?;

        if !self.repository.touch_series(series_id).await.or_raise(|| ErrorKind::Store)? {
            exn::bail!(ErrorKind::MissingSeries(series_id));
        }
        Ok(Outcome::Merged { series_id, series_created, new_episodes })
    }

    async fn create_series(&self, candidate: &Candidate) -> Result<SeriesInsert> {
        let record = self.resolver.resolve(&candidate.title, &self.options.preferred_country).await;
        let mut series = NewSeries::new(candidate.title.as_str()).with_source_url(candidate.url.as_str());
        match record {
            Some(record) => {
                let origin = record.primary_country().unwrap_or(&self.options.fallback_country).to_string();
                series = series.with_tmdb_id(record.id).with_origin_country(origin);
                series.original_title = record.original_name;
                series.poster_path = record.poster_path;
            },
            None => series = series.with_origin_country(self.options.fallback_country.as_str()),
        }
        let insert = self.repository.create_series(&series).await.or_raise(|| ErrorKind::Store)?;
        match insert {
            SeriesInsert::Created(id) => {
                tracing::info!(series_id = %id, tmdb_id = ?series.tmdb_id, "New series added");
            },
            SeriesInsert::Existing(id) => {
                tracing::debug!(series_id = %id, tmdb_id = ?series.tmdb_id, "Series already stored under another URL");
            },
        }
        Ok(insert)
    }

    /// Records the episodes the store does not know yet; returns how many.
    async fn merge_episodes(&self, series_id: SeriesId, links: Vec<EpisodeLink>) -> Result<usize> {
        let mut numbered: Vec<(u32, EpisodeLink)> = links
            .into_iter()
            .filter_map(|link| match link.number.filter(|number| *number > 0) {
                Some(number) => Some((number, link)),
                None => {
                    tracing::trace!(label = %link.label, "Skipping link without an episode number");
                    None
                },
            })
            .collect();
        numbered.sort_by_key(|(number, _)| *number);

        let mut created = 0;
        for (number, link) in numbered {
            if self.repository.episode_exists(series_id, DEFAULT_SEASON, number).await.or_raise(|| ErrorKind::Store)? {
                continue;
            }
            let title = Some(link.label).filter(|label| !label.is_empty());
            let episode = NewEpisode::new(series_id, number, link.url).with_title(title);
            match self.repository.create_episode(&episode).await.or_raise(|| ErrorKind::Store)? {
                EpisodeInsert::Created(id) => {
                    tracing::info!(episode_id = %id, episode = number, "New episode recorded");
                    created += 1;
                },
                EpisodeInsert::Duplicate => tracing::debug!(episode = number, "Episode recorded concurrently"),
            }
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airing_extract::error::{ErrorKind as ExtractErrorKind, Result as ExtractResult};
    use airing_extract::{PageSource, SeriesPage};
    use airing_metadata::error::Result as MetadataResult;
    use airing_metadata::{MetadataProvider, SearchResult};
    use airing_store::Database;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    /// A catalog site whose pages are fixed up front.
    #[derive(Default)]
    struct FakeSite {
        listing: Option<Vec<Candidate>>,
        pages: HashMap<String, Vec<EpisodeLink>>,
        broken: HashSet<String>,
        requested: Mutex<Vec<String>>,
    }
    impl FakeSite {
        fn listing(candidates: Vec<Candidate>) -> Self {
            Self { listing: Some(candidates), ..Self::default() }
        }

        fn page(mut self, url: &str, numbers: &[Option<u32>]) -> Self {
            let links = numbers
                .iter()
                .enumerate()
                .map(|(i, number)| EpisodeLink {
                    number: *number,
                    url: format!("{url}/link-{i}"),
                    label: number.map(|n| format!("Episode {n}")).unwrap_or_else(|| "Trailer".to_string()),
                })
                .collect();
            self.pages.insert(url.to_string(), links);
            self
        }

        fn broken(mut self, url: &str) -> Self {
            self.broken.insert(url.to_string());
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }
    #[async_trait]
    impl PageSource for FakeSite {
        async fn latest_updates(&self) -> ExtractResult<Vec<Candidate>> {
            match &self.listing {
                Some(candidates) => Ok(candidates.clone()),
                None => exn::bail!(ExtractErrorKind::Fetch("listing timed out".to_string())),
            }
        }

        async fn series_page(&self, url: &str) -> ExtractResult<SeriesPage> {
            self.requested.lock().unwrap().push(url.to_string());
            if self.broken.contains(url) {
                exn::bail!(ExtractErrorKind::Fetch(format!("timed out loading {url}")));
            }
            let episodes = self.pages.get(url).cloned().unwrap_or_default();
            Ok(SeriesPage { episodes, ..SeriesPage::default() })
        }
    }

    struct FakeProvider(HashMap<String, Vec<SearchResult>>);
    #[async_trait]
    impl MetadataProvider for FakeProvider {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn search_by_title(&self, title: &str, _: &str) -> MetadataResult<Vec<SearchResult>> {
            Ok(self.0.get(title).cloned().unwrap_or_default())
        }
    }

    const QUEEN: &str = "https://catalog.example/drama/queen-of-tears";
    const MOVING: &str = "https://catalog.example/drama/moving";
    const RUNNER: &str = "https://catalog.example/drama/lovely-runner";

    async fn store() -> (Database, Repository) {
        let db = Database::connect_in_memory().await.unwrap();
        let repository = Repository::from(&db);
        (db, repository)
    }

    fn reconciler(repository: &Repository, site: Arc<FakeSite>, resolver: Resolver) -> Reconciler {
        Reconciler::new(repository.clone(), site, resolver, SyncOptions::default())
    }

    async fn episode_numbers(repository: &Repository, url: &str) -> Vec<u32> {
        let series = repository.find_series_by_source_url(url).await.unwrap().unwrap();
        repository.list_episodes(series.id).await.unwrap().iter().map(|e| e.number).collect()
    }

    #[tokio::test]
    async fn test_new_series_with_metadata() {
        let (_db, repository) = store().await;
        let site = Arc::new(
            FakeSite::listing(vec![Candidate::new("Queen of Tears", QUEEN).with_episode_hint(2)])
                .page(QUEEN, &[Some(2), Some(1)]),
        );
        let mut poster = SearchResult::new(209374, "Rainha das Lágrimas").with_origin_country(&["KR"]);
        poster.poster_path = Some("/queen.jpg".to_string());
        poster.original_name = Some("눈물의 여왕".to_string());
        let provider = FakeProvider(HashMap::from([(
            "Queen of Tears".to_string(),
            vec![SearchResult::new(1, "Tears").with_origin_country(&["JP"]), poster],
        )]));
        let resolver = Resolver::new(Arc::new(provider), "pt-BR");

        let summary = reconciler(&repository, site, resolver).run().await.unwrap();

        assert_eq!((summary.candidates, summary.processed, summary.failed), (1, 1, 0));
        assert_eq!((summary.new_series, summary.new_episodes), (1, 2));
        assert_eq!((summary.stats.series, summary.stats.episodes), (1, 2));
        let series = repository.find_series_by_source_url(QUEEN).await.unwrap().unwrap();
        assert_eq!(series.title, "Queen of Tears");
        assert_eq!(series.tmdb_id, Some(209374));
        assert_eq!(series.original_title.as_deref(), Some("눈물의 여왕"));
        assert_eq!(series.origin_country.as_deref(), Some("KR"));
        assert_eq!(series.poster_path.as_deref(), Some("/queen.jpg"));
        let episodes = repository.list_episodes(series.id).await.unwrap();
        assert_eq!(episodes.iter().map(|e| (e.season, e.number)).collect::<Vec<_>>(), vec![(1, 1), (1, 2)]);
        assert_eq!(episodes[0].title.as_deref(), Some("Episode 1"));
        assert_eq!(episodes[0].quality, "auto");
    }

    #[tokio::test]
    async fn test_new_series_without_metadata() {
        let (_db, repository) = store().await;
        let site = Arc::new(FakeSite::listing(vec![Candidate::new("Moving", MOVING)]).page(MOVING, &[Some(1)]));

        let summary = reconciler(&repository, site, Resolver::disabled()).run().await.unwrap();

        assert_eq!(summary.new_series, 1);
        let series = repository.find_series_by_source_url(MOVING).await.unwrap().unwrap();
        assert_eq!(series.tmdb_id, None);
        assert_eq!(series.poster_path, None);
        assert_eq!(series.origin_country.as_deref(), Some("KR"));
    }

    #[tokio::test]
    async fn test_failing_candidate_does_not_abort_run() {
        let (_db, repository) = store().await;
        let site = Arc::new(
            FakeSite::listing(vec![
                Candidate::new("Queen of Tears", QUEEN),
                Candidate::new("Moving", MOVING),
                Candidate::new("Lovely Runner", RUNNER),
            ])
            .page(QUEEN, &[Some(1), Some(2)])
            .broken(MOVING)
            .page(RUNNER, &[Some(1)]),
        );

        let summary = reconciler(&repository, site, Resolver::disabled()).run().await.unwrap();

        assert_eq!(summary.candidates, 3);
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.new_episodes, 3);
        assert_eq!(episode_numbers(&repository, QUEEN).await, vec![1, 2]);
        assert_eq!(episode_numbers(&repository, RUNNER).await, vec![1]);
        // The series row of the failed candidate survives; its episodes are
        // picked up by a later run.
        assert!(episode_numbers(&repository, MOVING).await.is_empty());
    }

    #[tokio::test]
    async fn test_second_run_inserts_nothing_and_refreshes_timestamps() {
        let (db, repository) = store().await;
        let site = Arc::new(
            FakeSite::listing(vec![Candidate::new("Queen of Tears", QUEEN), Candidate::new("Moving", MOVING)])
                .page(QUEEN, &[Some(1), Some(2), Some(3)])
                .page(MOVING, &[Some(1)]),
        );
        let reconciler = reconciler(&repository, site.clone(), Resolver::disabled());

        let first = reconciler.run().await.unwrap();
        assert_eq!(first.new_episodes, 4);
        sqlx::query("UPDATE series SET updated_at = 1000").execute(db.pool()).await.unwrap();

        let second = reconciler.run().await.unwrap();
        assert_eq!(second.new_episodes, 0);
        assert_eq!(second.new_series, 0);
        assert_eq!(second.processed, 2);
        assert_eq!(second.stats, first.stats);
        for series in repository.list_all_series().await.unwrap() {
            assert!(series.updated_at.unix_timestamp() > 1000, "{} was not refreshed", series.title);
        }
        assert_eq!(site.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_recorded_hint_skips_episode_discovery() {
        let (_db, repository) = store().await;
        let id = repository.create_series(&NewSeries::new("Moving").with_source_url(MOVING)).await.unwrap().id();
        repository.create_episode(&NewEpisode::new(id, 20, format!("{MOVING}/20"))).await.unwrap();
        let site = Arc::new(FakeSite::listing(vec![Candidate::new("Moving", MOVING).with_episode_hint(20)]));

        let reconciler = reconciler(&repository, site.clone(), Resolver::disabled());
        let outcome = reconciler.reconcile(&Candidate::new("Moving", MOVING).with_episode_hint(20)).await.unwrap();
        let summary = reconciler.run().await.unwrap();

        assert_eq!(outcome, Outcome::CaughtUp { series_id: id });
        assert_eq!((summary.processed, summary.caught_up, summary.new_episodes), (1, 1, 0));
        assert!(site.requests().is_empty());
    }

    #[tokio::test]
    async fn test_unrecorded_hint_triggers_discovery() {
        let (_db, repository) = store().await;
        let id = repository.create_series(&NewSeries::new("Moving").with_source_url(MOVING)).await.unwrap().id();
        repository.create_episode(&NewEpisode::new(id, 1, format!("{MOVING}/1"))).await.unwrap();
        let site = Arc::new(
            FakeSite::listing(vec![Candidate::new("Moving", MOVING).with_episode_hint(3)])
                .page(MOVING, &[Some(3), Some(2), Some(1)]),
        );

        let outcome = reconciler(&repository, site.clone(), Resolver::disabled())
            .reconcile(&Candidate::new("Moving", MOVING).with_episode_hint(3))
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Merged { series_id: id, series_created: false, new_episodes: 2 });
        assert_eq!(site.requests(), vec![MOVING.to_string()]);
        assert_eq!(episode_numbers(&repository, MOVING).await, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_links_without_numbers_are_skipped() {
        let (_db, repository) = store().await;
        let site = Arc::new(FakeSite::listing(vec![]).page(MOVING, &[None, Some(2), Some(0), Some(2), Some(1)]));

        let outcome = reconciler(&repository, site, Resolver::disabled())
            .reconcile(&Candidate::new("Moving", MOVING))
            .await
            .unwrap();

        assert_eq!(outcome.new_episodes(), 2);
        assert_eq!(episode_numbers(&repository, MOVING).await, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_listing_failure_is_an_empty_run() {
        let (_db, repository) = store().await;
        let site = Arc::new(FakeSite::default());

        let summary = reconciler(&repository, site, Resolver::disabled()).run().await.unwrap();

        assert_eq!(summary, RunSummary::default());
    }

    #[tokio::test]
    async fn test_listing_is_capped() {
        let (_db, repository) = store().await;
        let candidates = (1..=25).map(|i| Candidate::new(format!("Drama {i}"), format!("{MOVING}-{i}"))).collect();
        let site = Arc::new(FakeSite::listing(candidates));

        let summary = reconciler(&repository, site.clone(), Resolver::disabled()).run().await.unwrap();

        assert_eq!(summary.candidates, MAX_CANDIDATES);
        assert_eq!(site.requests().len(), MAX_CANDIDATES);
    }

    #[tokio::test]
    async fn test_same_metadata_record_under_two_urls() {
        let (_db, repository) = store().await;
        let site = Arc::new(
            FakeSite::listing(vec![Candidate::new("Moving", MOVING), Candidate::new("Moving (Dub)", RUNNER)])
                .page(MOVING, &[Some(1)])
                .page(RUNNER, &[Some(1), Some(2)]),
        );
        let record = vec![SearchResult::new(96648, "Moving").with_origin_country(&["KR"])];
        let provider = FakeProvider(HashMap::from([
            ("Moving".to_string(), record.clone()),
            ("Moving (Dub)".to_string(), record),
        ]));

        let summary = reconciler(&repository, site, Resolver::new(Arc::new(provider), "pt-BR")).run().await.unwrap();

        assert_eq!(summary.new_series, 1);
        assert_eq!(summary.stats.series, 1);
        assert_eq!(summary.new_episodes, 2);
        assert_eq!(summary.processed, 2);
    }

    #[tokio::test]
    async fn test_store_failure_is_fatal() {
        let (db, repository) = store().await;
        let site = Arc::new(FakeSite::listing(vec![Candidate::new("Moving", MOVING)]).page(MOVING, &[Some(1)]));
        db.close().await;

        let err = reconciler(&repository, site, Resolver::disabled()).run().await.unwrap_err();

        assert!(matches!(&*err, ErrorKind::Store));
    }
}
