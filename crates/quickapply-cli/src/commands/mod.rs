pub mod completion;
pub mod config;
pub mod resume;
pub mod run;
pub mod search_url;

use anyhow::{Context, Result};
use quickapply_core::config::Config;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG: &str = "config.json";

/// Read the config file and apply environment overrides
///
/// Without an explicit path a missing `config.json` is fine: everything can
/// come from the environment.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let (path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG), false),
    };

    let mut config = Config::load(&path, explicit)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    config.apply_env(|key| std::env::var(key).ok());
    Ok(config)
}
