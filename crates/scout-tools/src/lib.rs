//! Capability framework for market-scout
//!
//! A capability is a named unit of work the orchestration loop can invoke
//! with a single string argument. It always answers with text: failures are
//! rendered into the returned string so the model can reason about them.

pub mod capability;
pub mod registry;

pub use capability::Capability;
pub use registry::{CapabilityRegistry, CapabilityRegistryBuilder, ValidatedCall};
