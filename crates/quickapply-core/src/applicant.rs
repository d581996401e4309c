use crate::config::Config;
use std::fmt;

/// Account login
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"********")
            .finish()
    }
}

/// What to search for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    pub job_title: String,
    pub location: String,
}

/// Everything the driver knows about the applicant; read-only for the run
#[derive(Debug, Clone)]
pub struct ApplicantProfile {
    resume_text: String,
    credentials: Credentials,
    criteria: SearchCriteria,
}

impl ApplicantProfile {
    pub fn new(resume_text: String, credentials: Credentials, criteria: SearchCriteria) -> Self {
        Self {
            resume_text,
            credentials,
            criteria,
        }
    }

    /// Combine validated configuration with the extracted resume text
    pub fn from_config(config: &Config, resume_text: String) -> Self {
        Self::new(
            resume_text,
            Credentials {
                email: config.email.clone(),
                password: config.password.clone(),
            },
            SearchCriteria {
                job_title: config.job_title.clone(),
                location: config.location.clone(),
            },
        )
    }

    pub fn resume_text(&self) -> &str {
        &self.resume_text
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }
}
