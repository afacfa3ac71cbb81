use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

/// The listing shows more cards than are worth checking in one run.
pub const MAX_CANDIDATES: usize = 20;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// Latest updates listing (home page). The site has shipped several themes,
// each selector list covers all of them.
selector!(CARD_SELECTOR, ".item-drama, .drama-item, .list-item");
selector!(CARD_TITLE_SELECTOR, "a.title, h3 a, .drama-title a");
selector!(CARD_LINK_SELECTOR, "a");
selector!(CARD_EPISODE_SELECTOR, ".episode, .ep-number, .latest-ep");
regex!(EPISODE_HINT_REGEX, r"(?i)(?:ep(?:isode)?|cap(?:ítulo)?)\s*(\d+)");

// Series page.
selector!(SERIES_TITLE_SELECTOR, "h1.title, .drama-title h1, .info h1");
selector!(SERIES_ORIGINAL_TITLE_SELECTOR, ".other-name, .alias, .original-title");
selector!(SERIES_DESCRIPTION_SELECTOR, ".description, .summary, .synopsis");
selector!(EPISODE_LINK_SELECTOR, ".episode-list a, .list-episode a, .episodios a");
regex!(FIRST_NUMBER_REGEX, r"(\d+)");
