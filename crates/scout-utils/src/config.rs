//! Environment-variable configuration helpers

use std::str::FromStr;
use thiserror::Error;

/// Error raised when an environment variable is present but unparsable
#[derive(Debug, Error)]
#[error("Invalid value for {key}: {value:?} ({reason})")]
pub struct EnvError {
    /// Variable name
    pub key: String,
    /// Raw value found in the environment
    pub value: String,
    /// Parser message
    pub reason: String,
}

/// Read a non-empty environment variable
pub fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read an environment variable or fall back to `default`
pub fn env_or(key: &str, default: &str) -> String {
    env_string(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, returning `Ok(None)` when it is unset
pub fn env_parse<T>(key: &str) -> Result<Option<T>, EnvError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_string(key) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|e| EnvError {
            key: key.to_string(),
            value: raw,
            reason: e.to_string(),
        }),
    }
}
