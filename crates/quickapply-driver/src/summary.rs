use quickapply_core::budget::GateDecision;
use quickapply_core::outcome::Disposition;
use std::fmt;

/// Where a listing is in its apply flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingState {
    Discovered,
    Opened,
    EligibilityChecked,
    Skipped,
    ApplyButtonClicked,
    FormInProgress,
    Submitted,
    Abandoned,
}

impl fmt::Display for ListingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ListingState::Discovered => "discovered",
            ListingState::Opened => "opened",
            ListingState::EligibilityChecked => "eligibility-checked",
            ListingState::Skipped => "skipped",
            ListingState::ApplyButtonClicked => "apply-button-clicked",
            ListingState::FormInProgress => "form-in-progress",
            ListingState::Submitted => "submitted",
            ListingState::Abandoned => "abandoned",
        };
        f.write_str(name)
    }
}

impl From<Disposition> for ListingState {
    fn from(disposition: Disposition) -> Self {
        match disposition {
            Disposition::Skipped => ListingState::Skipped,
            Disposition::Abandoned => ListingState::Abandoned,
        }
    }
}

/// Why the driving loop ended
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StopReason {
    #[default]
    ListingsExhausted,
    DailyLimitReached,
    SessionTimeExpired,
    Fatal(String),
}

impl StopReason {
    /// Stop reason for a gate verdict that does not allow continuing
    pub fn from_gate(decision: GateDecision) -> Option<Self> {
        match decision {
            GateDecision::Continue => None,
            GateDecision::DailyLimitReached => Some(StopReason::DailyLimitReached),
            GateDecision::SessionTimeExpired => Some(StopReason::SessionTimeExpired),
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::ListingsExhausted => write!(f, "no more listings"),
            StopReason::DailyLimitReached => write!(f, "daily application limit reached"),
            StopReason::SessionTimeExpired => write!(f, "session time limit reached"),
            StopReason::Fatal(message) => write!(f, "fatal error: {}", message),
        }
    }
}

/// Totals for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub discovered: usize,
    pub submitted: usize,
    pub skipped: usize,
    pub abandoned: usize,
    pub stop_reason: StopReason,
}

impl RunSummary {
    pub fn record(&mut self, disposition: Disposition) {
        match disposition {
            Disposition::Skipped => self.skipped += 1,
            Disposition::Abandoned => self.abandoned += 1,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self.stop_reason, StopReason::Fatal(_))
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "applied to {} jobs ({} discovered, {} skipped, {} abandoned); stopped: {}",
            self.submitted, self.discovered, self.skipped, self.abandoned, self.stop_reason
        )
    }
}
