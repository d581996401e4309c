use quickapply_core::outcome::SkipReason;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Session(#[from] quickapply_core::Error),

    #[error("Form stuck on step {step}: control is disabled")]
    FormStuck { step: usize },

    #[error("Form did not finish within {limit} steps")]
    StepLimitExceeded { limit: usize },

    #[error("Login failed: {0}")]
    Login(String),
}

impl Error {
    /// Whether the run has to stop
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Session(e) if e.is_fatal())
    }

    /// Why a listing that hit this error was abandoned
    pub fn skip_reason(&self) -> SkipReason {
        match self {
            Error::FormStuck { step } => SkipReason::FormStuck { step: *step },
            Error::StepLimitExceeded { limit } => SkipReason::StepLimitExceeded { limit: *limit },
            other => SkipReason::Failed(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
