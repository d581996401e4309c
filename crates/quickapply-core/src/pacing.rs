use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;

/// Inclusive range of seconds a randomized pause is drawn from
///
/// Serialized as a two-element array, e.g. `[45, 90]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct DelayRange {
    pub min: f64,
    pub max: f64,
}

impl DelayRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A range that always yields the same duration
    pub const fn fixed(secs: f64) -> Self {
        Self::new(secs, secs)
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "pacing.{} must be non-negative, got [{}, {}]",
                name, self.min, self.max
            )));
        }
        if self.max < self.min {
            return Err(Error::InvalidConfig(format!(
                "pacing.{} is inverted: [{}, {}]",
                name, self.min, self.max
            )));
        }
        Ok(())
    }

    /// Draw a duration uniformly from the range
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max <= self.min {
            return Duration::from_secs_f64(self.min.max(0.0));
        }
        Duration::from_secs_f64(rng.gen_range(self.min..=self.max))
    }
}

impl From<(f64, f64)> for DelayRange {
    fn from((min, max): (f64, f64)) -> Self {
        Self::new(min, max)
    }
}

impl From<DelayRange> for (f64, f64) {
    fn from(range: DelayRange) -> Self {
        (range.min, range.max)
    }
}

/// Every randomized pause the driver takes, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Wait after loading the search results page
    pub search_settle: DelayRange,
    /// Wait after reloading the results page between discovery attempts
    pub reload_settle: DelayRange,
    /// Wait after nudging the results page to trigger lazy loading
    pub lazy_load: DelayRange,
    /// Pause after scrolling an element into view
    pub scroll_into_view: DelayRange,
    /// Settle after opening a listing
    pub open_settle: DelayRange,
    /// Settle after clicking the quick-apply trigger
    pub apply_settle: DelayRange,
    /// Wait at the top of each form step
    pub form_step: DelayRange,
    /// Pause after clicking continue or submit
    pub form_advance: DelayRange,
    /// Delay between typed characters
    pub keystroke: DelayRange,
    /// Settle after a field has been typed
    pub field_settle: DelayRange,
    /// Pause after a submitted application
    pub between_applications: DelayRange,
    /// Pause after a listing that was not submitted
    pub between_listings: DelayRange,
    /// Cooldown window since the last submission
    pub cooldown_threshold: DelayRange,
    /// Pause taken while inside the cooldown window
    pub cooldown_pause: DelayRange,
    /// Settle after submitting the login form
    pub login_settle: DelayRange,
    /// Pause between natural scroll steps
    pub scroll_step: DelayRange,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            search_settle: DelayRange::new(5.0, 7.0),
            reload_settle: DelayRange::new(5.0, 7.0),
            lazy_load: DelayRange::new(2.0, 3.0),
            scroll_into_view: DelayRange::new(1.0, 2.0),
            open_settle: DelayRange::new(2.0, 3.0),
            apply_settle: DelayRange::new(2.0, 3.0),
            form_step: DelayRange::fixed(2.0),
            form_advance: DelayRange::fixed(2.0),
            keystroke: DelayRange::new(0.1, 0.3),
            field_settle: DelayRange::new(0.5, 1.5),
            between_applications: DelayRange::new(45.0, 90.0),
            between_listings: DelayRange::new(3.0, 5.0),
            cooldown_threshold: DelayRange::new(30.0, 60.0),
            cooldown_pause: DelayRange::new(5.0, 10.0),
            login_settle: DelayRange::fixed(5.0),
            scroll_step: DelayRange::new(0.5, 1.5),
        }
    }
}

impl PacingConfig {
    /// A configuration with every pause set to zero
    pub fn immediate() -> Self {
        let zero = DelayRange::fixed(0.0);
        Self {
            search_settle: zero,
            reload_settle: zero,
            lazy_load: zero,
            scroll_into_view: zero,
            open_settle: zero,
            apply_settle: zero,
            form_step: zero,
            form_advance: zero,
            keystroke: zero,
            field_settle: zero,
            between_applications: zero,
            between_listings: zero,
            cooldown_threshold: zero,
            cooldown_pause: zero,
            login_settle: zero,
            scroll_step: zero,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let ranges = [
            ("search_settle", self.search_settle),
            ("reload_settle", self.reload_settle),
            ("lazy_load", self.lazy_load),
            ("scroll_into_view", self.scroll_into_view),
            ("open_settle", self.open_settle),
            ("apply_settle", self.apply_settle),
            ("form_step", self.form_step),
            ("form_advance", self.form_advance),
            ("keystroke", self.keystroke),
            ("field_settle", self.field_settle),
            ("between_applications", self.between_applications),
            ("between_listings", self.between_listings),
            ("cooldown_threshold", self.cooldown_threshold),
            ("cooldown_pause", self.cooldown_pause),
            ("login_settle", self.login_settle),
            ("scroll_step", self.scroll_step),
        ];
        for (name, range) in ranges {
            range.validate(name)?;
        }
        Ok(())
    }
}

/// Source of randomized pauses
///
/// Holds its own RNG so draws never cross an `.await` with a thread-local
/// generator alive.
pub struct Pacer {
    rng: Mutex<StdRng>,
}

impl Pacer {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic pacer for tests
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Draw a duration from the range
    pub fn draw(&self, range: DelayRange) -> Duration {
        let mut rng = self.rng.lock().unwrap_or_else(|p| p.into_inner());
        range.sample(&mut *rng)
    }

    /// Draw an integer uniformly from `[min, max]`
    pub fn draw_between(&self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|p| p.into_inner());
        rng.gen_range(min..=max)
    }

    /// Sleep for a duration drawn from the range
    pub async fn pause(&self, range: DelayRange) -> Duration {
        let delay = self.draw(range);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        delay
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new()
    }
}
