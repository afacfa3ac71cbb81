use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Represents a Chrome/Chromium executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Chrome {
    /// A directly executable binary.
    Binary { path: PathBuf },
    /// A Flatpak-installed application.
    Flatpak { app_id: String },
}
impl Chrome {
    pub(crate) fn discover() -> Result<Self> {
        // Check for direct executables
        // TODO: What are the executable names on Windows? macOS?
        let executables = ["google-chrome", "chromium", "chromium-browser", "chrome"];
        for exe in executables {
            if let Ok(path) = which::which(exe) {
                tracing::debug!(chrome = %path.display(), "Discovered Chrome executable");
                return Ok(Self::Binary { path });
            }
        }
        tracing::info!("Chrome executable not found in PATH");
        if let Ok(flatpak) = which::which("flatpak") {
            tracing::trace!(flatpak = %flatpak.display(), "Discovered Flatpak on system; searching installed apps");
            let flatpak_apps = ["com.google.Chrome", "org.chromium.Chromium"];
            for app_id in flatpak_apps {
                if Command::new(&flatpak).args(["info", app_id]).output().is_ok_and(|o| o.status.success()) {
                    return Ok(Self::Flatpak { app_id: app_id.to_string() });
                }
            }
        } else {
            tracing::info!("Flatpak not found; skipping containerized Chrome checks.");
        }
        exn::bail!(ErrorKind::ChromeNotFound);
    }

    /// Use an explicitly configured executable (absolute path or a name to
    /// look up in `PATH`).
    pub(crate) fn at(path: impl AsRef<Path>) -> Result<Self> {
        let path = which::which(path.as_ref()).or_raise(|| ErrorKind::ChromeNotFound)?;
        Ok(Self::Binary { path })
    }

    /// A command that launches this browser; arguments still need adding.
    pub(crate) fn command(&self) -> tokio::process::Command {
        match self {
            Self::Binary { path } => tokio::process::Command::new(path),
            Self::Flatpak { app_id } => {
                let mut command = tokio::process::Command::new("flatpak");
                command.args(["run", app_id.as_str()]);
                command
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_explicit_path() {
        let err = Chrome::at("/definitely/not/a/browser").unwrap_err();
        assert!(matches!(&*err, ErrorKind::ChromeNotFound));
    }

    #[test]
    fn test_flatpak_command() {
        let chrome = Chrome::Flatpak { app_id: "org.chromium.Chromium".to_string() };
        let command = chrome.command();
        let std = command.as_std();
        assert_eq!(std.get_program(), "flatpak");
        assert_eq!(std.get_args().collect::<Vec<_>>(), vec!["run", "org.chromium.Chromium"]);
    }
}
