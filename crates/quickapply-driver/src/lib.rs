mod context;
pub mod discovery;
mod driver;
pub mod eligibility;
mod error;
pub mod fields;
pub mod form;
mod locate;
pub mod login;
pub mod responder;
mod summary;

#[cfg(test)]
mod testing;

pub use context::{Context, DriverSettings};
pub use driver::ApplicationDriver;
pub use error::{Error, Result};
pub use responder::{LlmError, OpenAiResponder, ResponseGenerator};
pub use summary::{ListingState, RunSummary, StopReason};
