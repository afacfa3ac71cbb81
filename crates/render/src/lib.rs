//! Renders catalog pages in headless Chrome/Chromium and returns the DOM as
//! it looks after scripts ran.
//!
//! The site builds its listings client-side, so a plain HTTP fetch does not
//! see them. Each page is a separate `--dump-dom` invocation with a hard
//! timeout.

mod chrome;
pub mod error;
mod options;
mod render;

use crate::chrome::Chrome;
use crate::error::Result;
pub use crate::options::{DEFAULT_USER_AGENT, RenderOptions};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Renderer {
    chrome: Chrome,
    options: RenderOptions,
}
impl Renderer {
    /// Discovers Chrome/Chromium on `PATH` or as a Flatpak app.
    pub fn new(options: RenderOptions) -> Result<Self> {
        Ok(Self { chrome: Chrome::discover()?, options })
    }

    /// Uses the given executable instead of discovering one.
    pub fn with_chrome(path: impl AsRef<Path>, options: RenderOptions) -> Result<Self> {
        Ok(Self { chrome: Chrome::at(path)?, options })
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }
}

#[cfg(feature = "fetch")]
mod fetch {
    use super::Renderer;
    use airing_extract::Fetch;
    use airing_extract::error::{ErrorKind, Result};
    use async_trait::async_trait;
    use exn::ResultExt;
    use url::Url;

    #[async_trait]
    impl Fetch for Renderer {
        async fn fetch(&self, url: &Url) -> Result<String> {
            self.render(url).await.or_raise(|| ErrorKind::Fetch(url.to_string()))
        }
    }
}
