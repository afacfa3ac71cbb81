//! Layered configuration for airing.
//!
//! Sources, later ones winning:
//! 1. built-in defaults ([`Config::default`]);
//! 2. a configuration file: the path given on the command line, otherwise
//!    `airing.{toml,yaml,yml,json}` in the platform configuration directory;
//! 3. environment variables prefixed with `AIRING_`, nested with `__`
//!    (e.g. `AIRING_SITE__TIMEOUT_SECS=45`);
//! 4. `TMDB_API_KEY` for the metadata credential.

pub mod error;
mod schedule;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::instrument;
use url::Url;

pub use crate::schedule::DailyTime;

const APPLICATION: &str = "airing";
const FILE_STEM: &str = "airing";
const ENV_PREFIX: &str = "AIRING_";
const API_KEY_VAR: &str = "TMDB_API_KEY";

fn web_url(value: &str, field: &'static str) -> Result<Url> {
    let url = Url::parse(value).or_raise(|| ErrorKind::Validation(field))?;
    if !matches!(url.scheme(), "http" | "https") {
        exn::bail!(ErrorKind::Validation(field));
    }
    Ok(url)
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APPLICATION)
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub site: SiteConfig,
    pub metadata: MetadataConfig,
    pub sync: SyncConfig,
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}
impl Default for DatabaseConfig {
    fn default() -> Self {
        let path = match project_dirs() {
            Some(dirs) => dirs.data_dir().join("airing.db"),
            None => PathBuf::from("airing.db"),
        };
        Self { path }
    }
}

/// The catalog site and how its pages are rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    pub user_agent: String,
    pub locale: String,
    pub timeout_secs: u64,
    pub settle_millis: u64,
    /// Explicit browser executable; discovered on `PATH` when absent.
    pub chrome: Option<PathBuf>,
}
impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://kissasian.cam".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            locale: "pt-BR".to_string(),
            timeout_secs: 30,
            settle_millis: 2000,
            chrome: None,
        }
    }
}
impl SiteConfig {
    /// The listing page; relative links on the site resolve against it.
    pub fn base_url(&self) -> Result<Url> {
        web_url(&self.base_url, "site.base_url")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Without a key metadata enrichment is disabled.
    pub api_key: Option<String>,
    pub base_url: String,
    pub language: String,
    pub timeout_secs: u64,
}
impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.themoviedb.org/3".to_string(),
            language: "pt-BR".to_string(),
            timeout_secs: 10,
        }
    }
}
impl MetadataConfig {
    pub fn base_url(&self) -> Result<Url> {
        web_url(&self.base_url, "metadata.base_url")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The configured key, unless it is blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Origin country preferred when several metadata records match a title.
    pub preferred_country: String,
    /// Origin recorded for new series without a metadata record.
    pub fallback_country: String,
}
impl Default for SyncConfig {
    fn default() -> Self {
        Self { preferred_country: "KR".to_string(), fallback_country: "KR".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Local wall-clock times at which a run starts, every day.
    pub times: Vec<DailyTime>,
    pub run_on_start: bool,
}
impl Default for ScheduleConfig {
    fn default() -> Self {
        let times = [(8, 0), (14, 0), (20, 0), (2, 0)].into_iter().filter_map(|(h, m)| DailyTime::new(h, m)).collect();
        Self { times, run_on_start: true }
    }
}

impl Config {
    /// Loads and validates configuration from every source.
    ///
    /// `path` replaces the default configuration file lookup and must exist.
    #[instrument(skip_all, fields(path = ?path))]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        match path {
            Some(path) => {
                if !path.is_file() {
                    exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
                }
                figment = Self::merge_file(figment, path);
            },
            None => {
                for path in Self::default_files() {
                    if path.is_file() {
                        tracing::debug!(path = %path.display(), "Loading configuration file");
                        figment = Self::merge_file(figment, &path);
                    }
                }
            },
        }
        let figment = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Env::raw().only(&[API_KEY_VAR]).map(|_| "metadata.api_key".into()));
        Self::from_figment(figment)
    }

    /// Extracts and validates a configuration from an arbitrary figment.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Invalid)?;
        config.validate()?;
        Ok(config)
    }

    /// Candidate configuration files in the platform configuration directory.
    pub fn default_files() -> Vec<PathBuf> {
        let Some(dirs) = project_dirs() else {
            return Vec::new();
        };
        ["toml", "yaml", "yml", "json"]
            .into_iter()
            .map(|extension| dirs.config_dir().join(format!("{FILE_STEM}.{extension}")))
            .collect()
    }

    fn merge_file(figment: Figment, path: &Path) -> Figment {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
            Some("json") => figment.merge(Json::file_exact(path)),
            _ => figment.merge(Toml::file_exact(path)),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.site.timeout_secs == 0 {
            exn::bail!(ErrorKind::Validation("site.timeout_secs"));
        }
        if self.metadata.timeout_secs == 0 {
            exn::bail!(ErrorKind::Validation("metadata.timeout_secs"));
        }
        self.site.base_url()?;
        self.metadata.base_url()?;
        if self.sync.preferred_country.trim().is_empty() {
            exn::bail!(ErrorKind::Validation("sync.preferred_country"));
        }
        if self.sync.fallback_country.trim().is_empty() {
            exn::bail!(ErrorKind::Validation("sync.fallback_country"));
        }
        if self.database.path.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Validation("database.path"));
        }
        Ok(())
    }
}
