use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Ordered list of browser binaries to try; the first usable one is launched
pub struct ChromeFinder {
    candidates: Vec<PathBuf>,
    /// Set when the user named a binary, which then must work
    explicit: bool,
}

impl ChromeFinder {
    /// Use `chrome_path` when configured, otherwise the install locations of
    /// Chrome, Chromium and Edge on this platform
    pub fn new(chrome_path: Option<PathBuf>) -> Self {
        match chrome_path {
            Some(path) => Self {
                candidates: vec![path],
                explicit: true,
            },
            None => Self::from_candidates(platform_candidates()),
        }
    }

    fn from_candidates(candidates: Vec<PathBuf>) -> Self {
        Self {
            candidates,
            explicit: false,
        }
    }

    /// Path of the browser the session will drive
    ///
    /// A configured path is reported with its own error; otherwise the error
    /// lists every location that was tried.
    pub fn find(&self) -> Result<PathBuf> {
        if self.explicit {
            if let Some(path) = self.candidates.first() {
                return usable(path);
            }
        }

        for candidate in &self.candidates {
            match usable(candidate) {
                Ok(path) => {
                    tracing::debug!("Using browser at {}", path.display());
                    return Ok(path);
                }
                Err(e) => tracing::trace!("Skipping {}: {}", candidate.display(), e),
            }
        }

        let tried: Vec<String> = self
            .candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        Err(Error::Browser(format!(
            "no Chrome, Chromium or Edge install found (tried {}); set browser.chrome_path or pass --chrome-path",
            tried.join(", ")
        )))
    }
}

fn platform_candidates() -> Vec<PathBuf> {
    let paths: &[&str] = if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
        ]
    } else if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/usr/bin/microsoft-edge",
        ]
    };
    paths.iter().map(PathBuf::from).collect()
}

/// The file exists and, on unix, carries an execute bit
fn usable(path: &Path) -> Result<PathBuf> {
    let metadata = std::fs::metadata(path)
        .map_err(|_| Error::Browser(format!("browser not found at {}", path.display())))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(Error::Browser(format!(
                "browser at {} is not executable",
                path.display()
            )));
        }
    }
    #[cfg(not(unix))]
    let _ = metadata;

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executable() -> tempfile::NamedTempFile {
        let temp = tempfile::NamedTempFile::new().unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(temp.path(), std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        temp
    }

    #[test]
    fn test_configured_path_is_used() {
        let binary = executable();
        let found = ChromeFinder::new(Some(binary.path().to_path_buf())).find().unwrap();
        assert_eq!(found, binary.path());
    }

    #[test]
    fn test_missing_configured_path_fails() {
        let err = ChromeFinder::new(Some(PathBuf::from("/nonexistent/chrome")))
            .find()
            .unwrap_err();
        assert!(err.to_string().contains("not found at /nonexistent/chrome"));
    }

    #[test]
    fn test_first_usable_candidate_wins() {
        let first = executable();
        let second = executable();
        let finder = ChromeFinder::from_candidates(vec![
            PathBuf::from("/nonexistent/chrome"),
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);

        assert_eq!(finder.find().unwrap(), first.path());
    }

    #[test]
    fn test_error_lists_every_candidate() {
        let finder = ChromeFinder::from_candidates(vec![
            PathBuf::from("/nonexistent/chrome"),
            PathBuf::from("/nonexistent/edge"),
        ]);

        let err = finder.find().unwrap_err().to_string();
        assert!(err.contains("/nonexistent/chrome, /nonexistent/edge"));
        assert!(err.contains("--chrome-path"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_candidate_is_skipped() {
        use std::os::unix::fs::PermissionsExt;
        let plain = tempfile::NamedTempFile::new().unwrap();
        std::fs::set_permissions(plain.path(), std::fs::Permissions::from_mode(0o644)).unwrap();
        let binary = executable();

        let finder = ChromeFinder::from_candidates(vec![
            plain.path().to_path_buf(),
            binary.path().to_path_buf(),
        ]);
        assert_eq!(finder.find().unwrap(), binary.path());

        let err = ChromeFinder::new(Some(plain.path().to_path_buf())).find().unwrap_err();
        assert!(err.to_string().contains("not executable"));
    }
}
