pub mod applicant;
pub mod budget;
pub mod config;
pub mod error;
pub mod outcome;
pub mod pacing;
pub mod resume;
pub mod search;
pub mod selectors;
pub mod session;

pub use error::{Error, Result};
