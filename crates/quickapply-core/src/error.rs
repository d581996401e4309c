use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Element error: {0}")]
    Element(String),

    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("Browser disconnected: {0}")]
    Disconnected(String),

    #[error("Daily application limit of {0} already reached")]
    BudgetExhausted(u32),
}

impl Error {
    /// Whether the browser session is unusable after this error
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Disconnected(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
