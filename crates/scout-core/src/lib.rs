//! Core abstractions for market-scout
//!
//! This crate defines the traits and error types shared by the orchestration
//! loop, the capability registry, and the domain crate.

pub mod agent;
pub mod error;

pub use agent::Agent;
pub use error::{Error, Result};
