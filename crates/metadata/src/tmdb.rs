use crate::error::{ErrorKind, Result};
use crate::models::SearchResult;
use crate::provider::MetadataProvider;
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

/// The Movie Database (TMDB) v3 API.
#[derive(Debug, Clone)]
pub struct Tmdb {
    client: Client,
    base_url: String,
    api_key: String,
}
impl Tmdb {
    /// Creates a client with a per-request timeout.
    ///
    /// Fails with [`ErrorKind::MissingCredential`] when `api_key` is blank,
    /// so a misconfiguration shows up once at startup instead of on every
    /// lookup.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            exn::bail!(ErrorKind::MissingCredential);
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .or_raise(|| ErrorKind::Request)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn search_url(&self) -> String {
        format!("{}/search/tv", self.base_url)
    }
}

#[async_trait]
impl MetadataProvider for Tmdb {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    #[instrument(skip(self))]
    async fn search_by_title(&self, title: &str, language: &str) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .get(self.search_url())
            .query(&[("api_key", self.api_key.as_str()), ("language", language), ("query", title), ("page", "1")])
            .send()
            .await
            // The URL carries the API key; keep it out of error reports.
            .map_err(reqwest::Error::without_url)
            .or_raise(|| ErrorKind::Request)?;
        let status = response.status();
        if !status.is_success() {
            exn::bail!(ErrorKind::Status(status.as_u16()));
        }
        let body: SearchResponse =
            response.json().await.map_err(reqwest::Error::without_url).or_raise(|| ErrorKind::InvalidResponse)?;
        tracing::debug!(results = body.results.len(), "TMDB search completed");
        Ok(body.results)
    }
}
