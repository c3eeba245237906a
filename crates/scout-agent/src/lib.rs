//! Orchestration loop for market-scout
//!
//! The [`Orchestrator`] drives a bounded decide/invoke loop:
//! 1. Ask the model for its next step, given the instruction and everything so far
//! 2. Parse the reply into an [`AgentAction`]
//! 3. Invoke proposed capabilities in order and feed their text back
//! 4. Stop on a final answer, or fail once the turn budget is spent
//!
//! [`SingleShot`] is the tool-less counterpart used for grounded chat.

pub mod action;
pub mod executor;
pub mod responder;
pub mod trace;

// Re-export key types
pub use action::{AgentAction, CallOrigin, ProposedCall, parse_response};
pub use executor::{
    NoOpObserver, Orchestrator, OrchestratorBuilder, OrchestratorConfig, RunObserver, RunOutcome,
};
pub use responder::{SingleShot, SingleShotConfig};
pub use trace::{CapabilityCall, Trace};
