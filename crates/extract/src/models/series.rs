/// Everything the series page says about a show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeriesPage {
    pub title: String,
    pub original_title: String,
    pub description: String,
    /// Sorted by episode number; links without a number come last, in page
    /// order.
    pub episodes: Vec<EpisodeLink>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpisodeLink {
    /// `None` when the label carries no positive number.
    pub number: Option<u32>,
    pub url: String,
    pub label: String,
}
impl EpisodeLink {
    pub fn new(number: impl Into<Option<u32>>, url: impl Into<String>) -> Self {
        let number = number.into();
        Self {
            number,
            url: url.into(),
            label: number.map(|n| format!("Episode {n}")).unwrap_or_default(),
        }
    }
}
