use crate::models::{MetadataRecord, SearchResult};
use crate::provider::ProviderHandle;
use tracing::instrument;

pub const DEFAULT_LANGUAGE: &str = "pt-BR";

/// Picks the canonical record among search results.
///
/// The first result produced in `country` wins; otherwise the provider's top
/// result. `None` only for an empty result list.
pub fn select_match(results: Vec<SearchResult>, country: &str) -> Option<SearchResult> {
    let preferred = results.iter().position(|result| result.is_from(country));
    results.into_iter().nth(preferred.unwrap_or(0))
}

/// Best-effort title to [`MetadataRecord`] resolution.
///
/// Never fails: every provider error is logged and reported as "no record",
/// so a sync run continues with bare series.
#[derive(Clone)]
pub struct Resolver {
    provider: Option<ProviderHandle>,
    language: String,
}
impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("provider", &self.provider.as_ref().map(|p| p.name()))
            .field("language", &self.language)
            .finish()
    }
}
impl Resolver {
    pub fn new(provider: ProviderHandle, language: impl Into<String>) -> Self {
        Self { provider: Some(provider), language: language.into() }
    }

    /// A resolver that never finds anything, for when no provider is
    /// configured.
    pub fn disabled() -> Self {
        Self { provider: None, language: DEFAULT_LANGUAGE.to_string() }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    #[instrument(skip(self), fields(provider = self.provider.as_ref().map(|p| p.name())))]
    pub async fn resolve(&self, title: &str, preferred_country: &str) -> Option<MetadataRecord> {
        let provider = self.provider.as_ref()?;
        let results = match provider.search_by_title(title, &self.language).await {
            Ok(results) => results,
            Err(error) => {
                tracing::warn!(error = ?error, "Metadata lookup failed; continuing without metadata");
                return None;
            },
        };
        let Some(result) = select_match(results, preferred_country) else {
            tracing::debug!("No metadata match");
            return None;
        };
        tracing::debug!(tmdb_id = result.id, name = %result.name, "Resolved metadata");
        Some(result.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, Result};
    use crate::provider::MetadataProvider;
    use async_trait::async_trait;
    use rstest::rstest;
    use std::sync::{Arc, Mutex};

    struct FixedResults {
        results: Vec<SearchResult>,
        queries: Mutex<Vec<(String, String)>>,
    }
    impl FixedResults {
        fn new(results: Vec<SearchResult>) -> Arc<Self> {
            Arc::new(Self { results, queries: Mutex::new(Vec::new()) })
        }
    }
    #[async_trait]
    impl MetadataProvider for FixedResults {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn search_by_title(&self, title: &str, language: &str) -> Result<Vec<SearchResult>> {
            self.queries.lock().unwrap().push((title.to_string(), language.to_string()));
            Ok(self.results.clone())
        }
    }

    struct Failing;
    #[async_trait]
    impl MetadataProvider for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn search_by_title(&self, _: &str, _: &str) -> Result<Vec<SearchResult>> {
            exn::bail!(ErrorKind::Status(503))
        }
    }

    fn jp_then_kr() -> Vec<SearchResult> {
        vec![
            SearchResult::new(1, "Drama (JP)").with_origin_country(&["JP"]),
            SearchResult::new(2, "Drama (KR)").with_origin_country(&["KR"]),
        ]
    }

    #[rstest]
    #[case("KR", Some(2))]
    #[case("JP", Some(1))]
    #[case("CN", Some(1))]
    fn test_select_match(#[case] country: &str, #[case] expected: Option<u64>) {
        assert_eq!(select_match(jp_then_kr(), country).map(|r| r.id), expected);
    }

    #[test]
    fn test_select_match_first_of_several_from_country() {
        let results = vec![
            SearchResult::new(1, "A").with_origin_country(&["US"]),
            SearchResult::new(2, "B").with_origin_country(&["CN", "KR"]),
            SearchResult::new(3, "C").with_origin_country(&["KR"]),
        ];
        assert_eq!(select_match(results, "KR").map(|r| r.id), Some(2));
    }

    #[test]
    fn test_select_match_empty() {
        assert_eq!(select_match(Vec::new(), "KR"), None);
    }

    #[tokio::test]
    async fn test_resolve_prefers_country() {
        let provider = FixedResults::new(jp_then_kr());
        let resolver = Resolver::new(provider.clone(), "pt-BR");
        let record = resolver.resolve("Drama", "KR").await.unwrap();
        assert_eq!(record.id, 2);
        assert_eq!(record.primary_country(), Some("KR"));
        assert_eq!(*provider.queries.lock().unwrap(), vec![("Drama".to_string(), "pt-BR".to_string())]);
    }

    #[tokio::test]
    async fn test_resolve_without_results() {
        let resolver = Resolver::new(FixedResults::new(Vec::new()), "pt-BR");
        assert_eq!(resolver.resolve("Unknown", "KR").await, None);
    }

    #[tokio::test]
    async fn test_resolve_provider_failure_is_absent() {
        let resolver = Resolver::new(Arc::new(Failing), "pt-BR");
        assert_eq!(resolver.resolve("Drama", "KR").await, None);
    }

    #[tokio::test]
    async fn test_disabled_resolver() {
        let resolver = Resolver::disabled();
        assert!(!resolver.is_enabled());
        assert_eq!(resolver.resolve("Drama", "KR").await, None);
    }
}
