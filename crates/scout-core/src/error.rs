//! Error types for scout-core

use thiserror::Error;

/// Result type alias for scout-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for agent operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Agent initialization failed
    #[error("Agent initialization failed: {0}")]
    InitializationFailed(String),

    /// Agent processing failed
    #[error("Agent processing failed: {0}")]
    ProcessingFailed(String),

    /// The model asked for a capability the registry does not contain
    #[error("Unknown capability: {name}. Available capabilities: {available}")]
    UnknownCapability {
        /// Name the model proposed
        name: String,
        /// Comma-separated registered names
        available: String,
    },

    /// A capability call did not match the capability's argument schema
    #[error("Malformed call to {name}: {reason}")]
    MalformedCall {
        /// Capability name
        name: String,
        /// What was wrong with the arguments
        reason: String,
    },

    /// The turn budget ran out before the model produced a final answer
    #[error("Agent did not reach a final answer within {max_turns} turns")]
    AgentTimeout {
        /// Configured turn budget
        max_turns: usize,
    },
}

impl Error {
    /// Whether the orchestration loop can feed this error back to the model and continue
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownCapability { .. } | Self::MalformedCall { .. }
        )
    }
}
