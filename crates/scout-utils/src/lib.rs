//! Shared utilities for market-scout
//!
//! This crate provides common functionality used across the workspace,
//! including logging setup and environment-driven configuration helpers.

pub mod config;
pub mod logging;

pub use config::{EnvError, env_or, env_parse, env_string};
pub use logging::{init_tracing, init_tracing_with_default};
