use quickapply_core::budget::Cooldown;
use quickapply_core::config::{Config, LimitsConfig};
use quickapply_core::pacing::{PacingConfig, Pacer};
use quickapply_core::search::SearchConfig;
use quickapply_core::selectors::SiteSelectors;
use quickapply_core::session::BrowserSession;

/// The slices of configuration the driver consults
#[derive(Debug, Clone, Default)]
pub struct DriverSettings {
    pub limits: LimitsConfig,
    pub pacing: PacingConfig,
    pub selectors: SiteSelectors,
    pub search: SearchConfig,
}

impl DriverSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            limits: config.limits.clone(),
            pacing: config.pacing.clone(),
            selectors: config.selectors.clone(),
            search: config.search.clone(),
        }
    }

    pub fn cooldown(&self) -> Cooldown {
        Cooldown {
            threshold: self.pacing.cooldown_threshold,
            pause: self.pacing.cooldown_pause,
        }
    }
}

/// Borrowed view of the browser, pacing and settings handed to each step
pub struct Context<'a, S: BrowserSession> {
    pub session: &'a S,
    pub pacer: &'a Pacer,
    pub settings: &'a DriverSettings,
}

impl<'a, S: BrowserSession> Context<'a, S> {
    pub fn new(session: &'a S, pacer: &'a Pacer, settings: &'a DriverSettings) -> Self {
        Self {
            session,
            pacer,
            settings,
        }
    }

    pub fn selectors(&self) -> &SiteSelectors {
        &self.settings.selectors
    }

    pub fn pacing(&self) -> &PacingConfig {
        &self.settings.pacing
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.settings.limits
    }
}
