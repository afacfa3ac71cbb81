use serde::{Deserialize, Serialize};

/// One entry of a provider's search-by-title response, in provider order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    /// ISO 3166-1 codes; a co-production lists several.
    #[serde(default)]
    pub origin_country: Vec<String>,
}
impl SearchResult {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            original_name: None,
            overview: None,
            poster_path: None,
            first_air_date: None,
            origin_country: Vec::new(),
        }
    }

    pub fn with_origin_country(mut self, countries: &[&str]) -> Self {
        self.origin_country = countries.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn is_from(&self, country: &str) -> bool {
        self.origin_country.iter().any(|c| c.eq_ignore_ascii_case(country))
    }
}

/// The canonical external record chosen for a series title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub id: u64,
    pub name: String,
    pub original_name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    /// `YYYY-MM-DD` as published by the provider.
    pub first_air_date: Option<String>,
    pub origin_country: Vec<String>,
}
impl MetadataRecord {
    /// First listed origin country, if any.
    pub fn primary_country(&self) -> Option<&str> {
        self.origin_country.first().map(String::as_str)
    }
}
impl From<SearchResult> for MetadataRecord {
    fn from(result: SearchResult) -> Self {
        // TMDB sends empty strings rather than nulls for some unknown fields.
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }
        Self {
            id: result.id,
            name: result.name,
            original_name: present(result.original_name),
            overview: present(result.overview),
            poster_path: present(result.poster_path),
            first_air_date: present(result.first_air_date),
            origin_country: result.origin_country,
        }
    }
}
