use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Browser user-data directory for one run
///
/// Named profiles keep the login cookie between runs; temporary ones are
/// deleted when dropped.
pub struct ProfileManager {
    path: PathBuf,
    temp: Option<tempfile::TempDir>,
}

impl ProfileManager {
    /// A fresh profile removed on drop
    pub fn temporary() -> Result<Self> {
        let temp = tempfile::Builder::new().prefix("quickapply-").tempdir()?;
        Ok(Self {
            path: temp.path().to_path_buf(),
            temp: Some(temp),
        })
    }

    /// Use (and create if needed) a profile directory at `path`
    pub fn persistent(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(&path)?;
        }
        Ok(Self { path, temp: None })
    }

    /// Resolve a named profile under `~/.quickapply/profiles`
    pub fn named(name: &str) -> Result<Self> {
        Self::persistent(Self::profiles_dir()?.join(Self::check_name(name)?))
    }

    /// Named profile when a name is given, temporary otherwise
    pub fn for_run(name: Option<&str>) -> Result<Self> {
        match name {
            Some(name) => Self::named(name),
            None => Self::temporary(),
        }
    }

    pub fn profiles_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Browser("Could not determine home directory".to_string()))?;
        Ok(home.join(".quickapply").join("profiles"))
    }

    fn check_name(name: &str) -> Result<&str> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\']);
        if valid {
            Ok(name)
        } else {
            Err(Error::Browser(format!("Invalid profile name: '{}'", name)))
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }
}
