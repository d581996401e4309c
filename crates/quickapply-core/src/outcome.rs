use crate::Error;
use std::fmt;

/// Result of one driver operation
///
/// `Skip` means this unit of work is over but the run goes on; `Fatal` means
/// the run cannot continue.
#[derive(Debug)]
pub enum Outcome<T> {
    Success(T),
    Skip(SkipReason),
    Fatal(Error),
}

/// How a listing that was not submitted ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Filtered out before any apply attempt
    Skipped,
    /// An apply attempt started and could not finish
    Abandoned,
}

/// Why a listing or step was not completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No visible title link in the listing card
    TitleNotFound,
    /// The listing has no quick-apply button
    NotQuickApply,
    /// The quick-apply trigger could not be located or clicked
    TriggerNotFound,
    /// A form control was present but disabled
    FormStuck { step: usize },
    /// The form kept asking for more steps
    StepLimitExceeded { limit: usize },
    /// Any other failure during the listing flow
    Failed(String),
}

impl SkipReason {
    pub fn disposition(&self) -> Disposition {
        match self {
            SkipReason::TitleNotFound | SkipReason::NotQuickApply => Disposition::Skipped,
            _ => Disposition::Abandoned,
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TitleNotFound => write!(f, "could not find job title element"),
            SkipReason::NotQuickApply => write!(f, "not a quick-apply listing"),
            SkipReason::TriggerNotFound => write!(f, "could not click the quick-apply button"),
            SkipReason::FormStuck { step } => {
                write!(f, "form stuck on step {}: control is disabled", step)
            }
            SkipReason::StepLimitExceeded { limit } => {
                write!(f, "form exceeded {} steps", limit)
            }
            SkipReason::Failed(message) => write!(f, "{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disposition_split() {
        assert_eq!(SkipReason::NotQuickApply.disposition(), Disposition::Skipped);
        assert_eq!(SkipReason::TitleNotFound.disposition(), Disposition::Skipped);
        assert_eq!(SkipReason::TriggerNotFound.disposition(), Disposition::Abandoned);
        assert_eq!(
            SkipReason::FormStuck { step: 2 }.disposition(),
            Disposition::Abandoned
        );
    }
}
