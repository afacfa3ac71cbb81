/// One entry of the site's "latest updates" listing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate {
    pub title: String,
    /// Absolute URL of the series page; doubles as the series' identity on
    /// the site.
    pub url: String,
    /// Most recent episode number advertised on the card, when one could be
    /// parsed from [`episode_text`](Self::episode_text).
    pub episode_hint: Option<u32>,
    /// Raw text of the card's episode badge (may be empty).
    pub episode_text: String,
}
impl Candidate {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            episode_hint: None,
            episode_text: String::new(),
        }
    }

    pub fn with_episode_hint(mut self, hint: impl Into<Option<u32>>) -> Self {
        self.episode_hint = hint.into();
        self
    }
}
