use crate::{Error, Result};
use rand::seq::SliceRandom;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

/// Manages the browser process lifecycle
pub struct ChromeLauncher {
    chrome_path: PathBuf,
    profile_path: PathBuf,
    debugging_port: u16,
    headless: bool,
    user_agent: Option<String>,
}

impl ChromeLauncher {
    pub fn new(chrome_path: PathBuf, profile_path: PathBuf, debugging_port: u16) -> Self {
        Self {
            chrome_path,
            profile_path,
            debugging_port,
            headless: false,
            user_agent: None,
        }
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Use one of the given user agents, picked at random
    pub fn random_user_agent(mut self, candidates: &[String]) -> Self {
        self.user_agent = candidates.choose(&mut rand::thread_rng()).cloned();
        self
    }

    /// Start the browser with remote debugging enabled
    pub fn launch(&self) -> Result<Child> {
        let args = self.build_args();
        tracing::debug!("Launching {} {}", self.chrome_path.display(), args.join(" "));

        Command::new(&self.chrome_path)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Browser(format!("Failed to launch Chrome: {}", e)))
    }

    fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--remote-debugging-port={}", self.debugging_port),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            format!("--user-data-dir={}", self.profile_path.display()),
            "--disable-notifications".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
            "--disable-infobars".to_string(),
            "--start-maximized".to_string(),
        ];

        if self.headless {
            args.push("--headless=new".to_string());
            args.push("--window-size=1920,1080".to_string());
        }

        if let Some(agent) = &self.user_agent {
            args.push(format!("--user-agent={}", agent));
        }

        args.push("about:blank".to_string());
        args
    }

    pub fn debugging_port(&self) -> u16 {
        self.debugging_port
    }
}
