use crate::error::Result;
use crate::models::SearchResult;
use async_trait::async_trait;
use std::sync::Arc;

pub type ProviderHandle = Arc<dyn MetadataProvider + Send + Sync>;

/// An external catalogue of TV series that can be searched by title.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Short, lowercase identifier used in logs (e.g. `"tmdb"`).
    fn name(&self) -> &'static str;

    /// Search TV series by title.
    ///
    /// Results are returned in the provider's relevance order; an unknown
    /// title is an empty list, not an error. `language` is a BCP 47 tag and
    /// selects the language of localized fields.
    async fn search_by_title(&self, title: &str, language: &str) -> Result<Vec<SearchResult>>;
}
