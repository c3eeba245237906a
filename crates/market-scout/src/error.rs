//! Error types for market-scout

use thiserror::Error;

/// Errors raised by the domain crate
#[derive(Debug, Error)]
pub enum ScoutError {
    /// Upstream data provider returned nothing usable
    #[error("No data for {ticker}: {reason}")]
    NoData {
        ticker: String,
        reason: String,
    },

    /// Chat attempted before any report exists
    #[error("No report has been generated yet. Run an analysis first.")]
    NoContext,

    /// Ticker failed normalization
    #[error("Invalid ticker: {0:?}")]
    InvalidTicker(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Price-data collaborator failure
    #[error("Market data error: {0}")]
    MarketData(String),

    /// News feed failure
    #[error("Feed error: {0}")]
    Feed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// CLI command could not be parsed
    #[error("{0}")]
    Command(String),

    /// Prompt template failed to render
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Orchestration or language-model failure
    #[error(transparent)]
    Agent(#[from] scout_core::Error),
}

/// Result type alias for scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

impl ScoutError {
    /// Whether this is a turn-budget exhaustion from the analysis loop
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Agent(scout_core::Error::AgentTimeout { .. }))
    }
}

impl From<ScoutError> for scout_core::Error {
    fn from(err: ScoutError) -> Self {
        match err {
            ScoutError::Agent(inner) => inner,
            other => scout_core::Error::ProcessingFailed(other.to_string()),
        }
    }
}

impl From<scout_utils::EnvError> for ScoutError {
    fn from(err: scout_utils::EnvError) -> Self {
        ScoutError::Config(err.to_string())
    }
}

impl From<minijinja::Error> for ScoutError {
    fn from(err: minijinja::Error) -> Self {
        ScoutError::Prompt(err.to_string())
    }
}
