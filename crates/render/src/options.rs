use std::path::Path;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// How pages are loaded and presented to the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub user_agent: String,
    /// BCP 47 language tag sent as the browser UI language.
    pub locale: String,
    pub viewport: (u32, u32),
    /// Hard limit for one page; Chrome is killed when it runs out.
    pub timeout: Duration,
    /// Virtual time granted to scripts after load, so dynamically inserted
    /// listings are present in the dumped DOM.
    pub settle: Duration,
}
impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            locale: "pt-BR".to_string(),
            viewport: (1920, 1080),
            timeout: Duration::from_secs(30),
            settle: Duration::from_millis(2000),
        }
    }
}
impl RenderOptions {
    /// Command-line flags for a single `--dump-dom` invocation; the URL goes
    /// last and is not included.
    pub(crate) fn args(&self, profile: &Path) -> Vec<String> {
        let (width, height) = self.viewport;
        vec![
            "--headless=new".to_string(),
            "--disable-gpu".to_string(),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-extensions".to_string(),
            "--mute-audio".to_string(),
            "--hide-scrollbars".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
            "--blink-settings=imagesEnabled=false".to_string(),
            format!("--user-agent={}", self.user_agent),
            format!("--lang={}", self.locale),
            format!("--window-size={width},{height}"),
            format!("--virtual-time-budget={}", self.settle.as_millis()),
            format!("--user-data-dir={}", profile.display()),
            "--dump-dom".to_string(),
        ]
    }
}
