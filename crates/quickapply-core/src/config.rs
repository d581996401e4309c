use crate::pacing::PacingConfig;
use crate::search::SearchConfig;
use crate::selectors::SiteSelectors;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variables that override the required config values
pub const ENV_EMAIL: &str = "QUICKAPPLY_EMAIL";
pub const ENV_PASSWORD: &str = "QUICKAPPLY_PASSWORD";
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_RESUME: &str = "QUICKAPPLY_RESUME";
pub const ENV_JOB_TITLE: &str = "QUICKAPPLY_JOB_TITLE";
pub const ENV_LOCATION: &str = "QUICKAPPLY_LOCATION";

const MASK: &str = "********";

/// Run configuration, read once at startup
///
/// `Debug` output masks the password and API key.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, alias = "openai_api_key")]
    pub api_key: String,
    #[serde(default)]
    pub resume_path: PathBuf,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub selectors: SiteSelectors,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub browser: BrowserOptions,
    #[serde(default)]
    pub llm: LlmOptions,
}

/// Hard bounds on one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub daily_application_limit: u32,
    pub session_hours: f64,
    /// Upper bound on form steps before an application is abandoned
    pub max_form_steps: usize,
    /// Attempts to find the results container before giving up
    pub discovery_retries: u32,
    /// Listing cards spot-checked for a readable title
    pub verify_items: usize,
    /// Polling wait for the results container, seconds
    pub container_wait_secs: f64,
    /// Polling wait for continue/submit controls, seconds
    pub form_control_wait_secs: f64,
    /// Polling wait for the login form, seconds
    pub login_wait_secs: f64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            daily_application_limit: 15,
            session_hours: 4.0,
            max_form_steps: 10,
            discovery_retries: 3,
            verify_items: 3,
            container_wait_secs: 10.0,
            form_control_wait_secs: 5.0,
            login_wait_secs: 10.0,
        }
    }
}

impl LimitsConfig {
    pub fn session_limit(&self) -> Duration {
        Duration::from_secs_f64(self.session_hours * 3600.0)
    }

    pub fn container_wait(&self) -> Duration {
        Duration::from_secs_f64(self.container_wait_secs)
    }

    pub fn form_control_wait(&self) -> Duration {
        Duration::from_secs_f64(self.form_control_wait_secs)
    }

    pub fn login_wait(&self) -> Duration {
        Duration::from_secs_f64(self.login_wait_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.daily_application_limit == 0 {
            return Err(Error::InvalidConfig(
                "limits.daily_application_limit must be at least 1".to_string(),
            ));
        }
        if self.max_form_steps == 0 {
            return Err(Error::InvalidConfig(
                "limits.max_form_steps must be at least 1".to_string(),
            ));
        }
        if self.discovery_retries == 0 {
            return Err(Error::InvalidConfig(
                "limits.discovery_retries must be at least 1".to_string(),
            ));
        }
        let durations = [
            ("session_hours", self.session_hours),
            ("container_wait_secs", self.container_wait_secs),
            ("form_control_wait_secs", self.form_control_wait_secs),
            ("login_wait_secs", self.login_wait_secs),
        ];
        for (name, value) in durations {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "limits.{} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// How the browser is started
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserOptions {
    pub chrome_path: Option<PathBuf>,
    /// Persistent profile name under `~/.quickapply/profiles`; temporary when unset
    pub profile: Option<String>,
    pub headless: bool,
    pub debugging_port: u16,
    /// One is picked at random per run
    pub user_agents: Vec<String>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            chrome_path: None,
            profile: None,
            headless: false,
            debugging_port: 9222,
            user_agents: vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
            ],
        }
    }
}

/// Upper bound on `llm.max_retries`
pub const MAX_LLM_RETRIES: u32 = 10;

/// Language-model endpoint used to answer form questions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmOptions {
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for LlmOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout_secs: 90,
            max_retries: 3,
        }
    }
}

impl LlmOptions {
    fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(Error::InvalidConfig("llm.model must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::InvalidConfig(
                "llm.timeout_secs must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_LLM_RETRIES).contains(&self.max_retries) {
            return Err(Error::InvalidConfig(format!(
                "llm.max_retries must be between 1 and {}, got {}",
                MAX_LLM_RETRIES, self.max_retries
            )));
        }
        url::Url::parse(&self.base_url).map_err(|e| {
            Error::InvalidConfig(format!("llm.base_url {:?} is not a URL: {}", self.base_url, e))
        })?;
        Ok(())
    }
}

fn mask(secret: &str) -> &str {
    if secret.is_empty() { "" } else { MASK }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("email", &self.email)
            .field("password", &mask(&self.password))
            .field("api_key", &mask(&self.api_key))
            .field("resume_path", &self.resume_path)
            .field("job_title", &self.job_title)
            .field("location", &self.location)
            .field("limits", &self.limits)
            .field("pacing", &self.pacing)
            .field("selectors", &self.selectors)
            .field("search", &self.search)
            .field("browser", &self.browser)
            .field("llm", &self.llm)
            .finish()
    }
}

impl Config {
    /// Parse a JSON config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load the config file if present, otherwise start from defaults
    ///
    /// An explicitly requested file must exist.
    pub fn load(path: &Path, explicit: bool) -> Result<Self> {
        if path.exists() || explicit {
            Self::from_file(path)
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Replace required values with non-empty variables from `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_EMAIL) {
            self.email = v;
        }
        if let Some(v) = get(ENV_PASSWORD) {
            self.password = v;
        }
        if let Some(v) = get(ENV_API_KEY) {
            self.api_key = v;
        }
        if let Some(v) = get(ENV_RESUME) {
            self.resume_path = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_JOB_TITLE) {
            self.job_title = v;
        }
        if let Some(v) = get(ENV_LOCATION) {
            self.location = v;
        }
    }

    /// Check that every required value is present and every range is sane
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("email", self.email.as_str()),
            ("password", self.password.as_str()),
            ("api_key", self.api_key.as_str()),
            ("job_title", self.job_title.as_str()),
            ("location", self.location.as_str()),
        ];
        let mut missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if self.resume_path.as_os_str().is_empty() {
            missing.push("resume_path");
        }
        if !missing.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "missing required values: {}",
                missing.join(", ")
            )));
        }

        self.limits.validate()?;
        self.pacing.validate()?;
        self.selectors.validate()?;
        self.llm.validate()?;
        self.search.search_url(&crate::applicant::SearchCriteria {
            job_title: self.job_title.clone(),
            location: self.location.clone(),
        })?;
        self.search.login_url()?;
        Ok(())
    }

    /// Copy with secrets replaced, for display
    pub fn masked(&self) -> Self {
        let mut masked = self.clone();
        masked.password = mask(&self.password).to_string();
        masked.api_key = mask(&self.api_key).to_string();
        masked
    }
}
