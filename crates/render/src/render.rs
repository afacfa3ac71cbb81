use crate::Renderer;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::process::Stdio;
use tracing::instrument;
use url::Url;

impl Renderer {
    /// Loads `url` in a fresh headless browser and returns the serialized DOM
    /// once scripts have settled.
    ///
    /// Every call gets a throwaway profile directory, so no cookies or cache
    /// carry over between pages.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn render(&self, url: &Url) -> Result<String> {
        let profile = tempfile::TempDir::new().or_raise(|| ErrorKind::Io)?;
        let mut command = self.chrome.command();
        command
            .args(self.options.args(profile.path()))
            .arg(url.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the child on timeout must not leave a browser behind.
            .kill_on_drop(true);
        let child = command.spawn().or_raise(|| ErrorKind::Io)?;
        let output = match tokio::time::timeout(self.options.timeout, child.wait_with_output()).await {
            Ok(output) => output.or_raise(|| ErrorKind::Io)?,
            Err(_) => {
                tracing::warn!(timeout = ?self.options.timeout, "Chrome timed out; killed");
                exn::bail!(ErrorKind::ChromeTimeout(self.options.timeout));
            },
        };
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!(stderr = %stderr.trim(), "Chrome stderr");
            exn::bail!(ErrorKind::ChromeFailed(output.status.code().unwrap_or(-1)));
        }
        let html = String::from_utf8_lossy(&output.stdout).into_owned();
        if html.trim().is_empty() {
            exn::bail!(ErrorKind::EmptyDocument);
        }
        tracing::debug!(html_size = html.len(), "Rendered page");
        Ok(html)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use crate::{RenderOptions, Renderer};
    use crate::error::ErrorKind;
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;
    use std::time::Duration;
    use url::Url;

    /// Writes a shell script standing in for Chrome.
    fn fake_chrome(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("chrome");
        {
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(file, "#!/bin/sh\n{body}").unwrap();
            file.sync_all().unwrap();
        }
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn url() -> Url {
        Url::parse("https://catalog.example/").unwrap()
    }

    #[tokio::test]
    async fn test_render_returns_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let chrome = fake_chrome(&dir, r#"for last; do :; done; echo "<html><body>$last</body></html>""#);
        let renderer = Renderer::with_chrome(chrome, RenderOptions::default()).unwrap();
        let html = renderer.render(&url()).await.unwrap();
        assert_eq!(html.trim(), "<html><body>https://catalog.example/</body></html>");
    }

    #[tokio::test]
    async fn test_render_failure_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let chrome = fake_chrome(&dir, "echo 'crashed' >&2; exit 3");
        let renderer = Renderer::with_chrome(chrome, RenderOptions::default()).unwrap();
        let err = renderer.render(&url()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::ChromeFailed(3)));
    }

    #[tokio::test]
    async fn test_render_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let chrome = fake_chrome(&dir, "exit 0");
        let renderer = Renderer::with_chrome(chrome, RenderOptions::default()).unwrap();
        let err = renderer.render(&url()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::EmptyDocument));
    }

    #[tokio::test]
    async fn test_render_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let chrome = fake_chrome(&dir, "exec sleep 10");
        let options = RenderOptions { timeout: Duration::from_millis(200), ..RenderOptions::default() };
        let renderer = Renderer::with_chrome(chrome, options).unwrap();
        let err = renderer.render(&url()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::ChromeTimeout(_)));
        assert!(err.is_retryable());
    }
}
