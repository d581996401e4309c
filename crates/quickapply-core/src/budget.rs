use crate::pacing::{DelayRange, Pacer};
use crate::{Error, Result};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Verdict of the session budget gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Continue,
    DailyLimitReached,
    SessionTimeExpired,
}

impl GateDecision {
    pub fn allows(self) -> bool {
        matches!(self, GateDecision::Continue)
    }
}

impl fmt::Display for GateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateDecision::Continue => write!(f, "continue"),
            GateDecision::DailyLimitReached => write!(f, "daily application limit reached"),
            GateDecision::SessionTimeExpired => write!(f, "session time limit reached"),
        }
    }
}

/// Cooldown applied by the gate while the last submission is recent
#[derive(Debug, Clone, Copy)]
pub struct Cooldown {
    /// Window since the last action inside which the gate pauses
    pub threshold: DelayRange,
    /// Length of the pause
    pub pause: DelayRange,
}

/// In-memory counters and limits bounding one run
#[derive(Debug)]
pub struct SessionBudget {
    submitted: u32,
    daily_limit: u32,
    session_start: Instant,
    last_action: Instant,
    session_limit: Duration,
}

impl SessionBudget {
    /// Start a budget; the session clock starts now
    pub fn new(daily_limit: u32, session_limit: Duration) -> Self {
        let now = Instant::now();
        Self {
            submitted: 0,
            daily_limit,
            session_start: now,
            last_action: now,
            session_limit,
        }
    }

    pub fn submitted(&self) -> u32 {
        self.submitted
    }

    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    pub fn session_limit(&self) -> Duration {
        self.session_limit
    }

    /// Time since the session started
    pub fn elapsed(&self) -> Duration {
        self.session_start.elapsed()
    }

    /// Time since the last confirmed submission (or session start)
    pub fn since_last_action(&self) -> Duration {
        self.last_action.elapsed()
    }

    /// Record a confirmed submission
    ///
    /// Fails without counting if the daily limit is already met.
    pub fn record_submission(&mut self) -> Result<()> {
        if self.submitted >= self.daily_limit {
            return Err(Error::BudgetExhausted(self.daily_limit));
        }
        self.submitted += 1;
        self.last_action = Instant::now();
        Ok(())
    }

    /// Limit check without any pause
    pub fn check(&self) -> GateDecision {
        if self.submitted >= self.daily_limit {
            return GateDecision::DailyLimitReached;
        }
        if self.elapsed() > self.session_limit {
            return GateDecision::SessionTimeExpired;
        }
        GateDecision::Continue
    }

    /// Decide whether another listing may be attempted
    ///
    /// Pauses when the last action falls inside a freshly drawn cooldown
    /// window. The pause is taken on every call inside the window; the gate
    /// never moves `last_action` itself. The time limit is checked again after
    /// the pause.
    pub async fn gate(&self, pacer: &Pacer, cooldown: Cooldown) -> GateDecision {
        let decision = self.check();
        if !decision.allows() {
            tracing::info!("Stopping: {}", decision);
            return decision;
        }

        let threshold = pacer.draw(cooldown.threshold);
        if self.since_last_action() < threshold {
            let slept = pacer.pause(cooldown.pause).await;
            tracing::debug!("Cooldown pause of {:.1}s", slept.as_secs_f64());
        }

        let decision = self.check();
        if !decision.allows() {
            tracing::info!("Stopping: {}", decision);
        }
        decision
    }

    /// Boolean view of [`SessionBudget::gate`]
    pub async fn may_continue(&self, pacer: &Pacer, cooldown: Cooldown) -> bool {
        self.gate(pacer, cooldown).await.allows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cooldown(threshold: f64, pause: f64) -> Cooldown {
        Cooldown {
            threshold: DelayRange::fixed(threshold),
            pause: DelayRange::fixed(pause),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_stops_at_daily_limit() {
        let mut budget = SessionBudget::new(2, Duration::from_secs(3600));
        let pacer = Pacer::seeded(1);

        budget.record_submission().unwrap();
        assert!(budget.may_continue(&pacer, cooldown(0.0, 0.0)).await);
        budget.record_submission().unwrap();
        assert_eq!(
            budget.gate(&pacer, cooldown(0.0, 0.0)).await,
            GateDecision::DailyLimitReached
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_never_exceeds_limit() {
        let mut budget = SessionBudget::new(1, Duration::from_secs(3600));
        budget.record_submission().unwrap();
        let err = budget.record_submission().unwrap_err();
        assert!(matches!(err, Error::BudgetExhausted(1)));
        assert_eq!(budget.submitted(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_stops_after_session_limit() {
        let budget = SessionBudget::new(15, Duration::from_secs(4 * 3600));
        let pacer = Pacer::seeded(1);

        tokio::time::advance(Duration::from_secs(4 * 3600 + 1)).await;
        assert_eq!(
            budget.gate(&pacer, cooldown(0.0, 0.0)).await,
            GateDecision::SessionTimeExpired
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_pauses_inside_cooldown_window() {
        let budget = SessionBudget::new(15, Duration::from_secs(3600));
        let pacer = Pacer::seeded(1);

        let start = Instant::now();
        assert!(budget.may_continue(&pacer, cooldown(30.0, 7.0)).await);
        assert_eq!(start.elapsed(), Duration::from_secs(7));

        // Still inside the window: the gate pauses again
        assert!(budget.may_continue(&pacer, cooldown(30.0, 7.0)).await);
        assert_eq!(start.elapsed(), Duration::from_secs(14));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_skips_pause_outside_cooldown_window() {
        let budget = SessionBudget::new(15, Duration::from_secs(3600));
        let pacer = Pacer::seeded(1);

        tokio::time::advance(Duration::from_secs(61)).await;
        let start = Instant::now();
        assert!(budget.may_continue(&pacer, cooldown(60.0, 7.0)).await);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_crossing_session_limit_stops() {
        let budget = SessionBudget::new(15, Duration::from_secs(10));
        let pacer = Pacer::seeded(1);

        tokio::time::advance(Duration::from_secs(8)).await;
        assert_eq!(
            budget.gate(&pacer, cooldown(30.0, 5.0)).await,
            GateDecision::SessionTimeExpired
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_does_not_mutate_counters() {
        let budget = SessionBudget::new(3, Duration::from_secs(3600));
        let pacer = Pacer::seeded(1);
        let before = budget.since_last_action();
        budget.gate(&pacer, cooldown(30.0, 5.0)).await;
        assert_eq!(budget.submitted(), 0);
        assert!(budget.since_last_action() > before);
    }
}
