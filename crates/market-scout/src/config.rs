//! Configuration for market-scout

use crate::error::{Result, ScoutError};
use scout_utils::{env_or, env_parse, env_string};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime configuration for the analyst, chat and data feeds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoutConfig {
    /// Gemini model identifier
    pub model: String,

    /// Google API key; never serialized
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,

    /// Maximum Deciding steps per analysis run
    pub max_turns: usize,

    /// Sampling temperature
    pub temperature: f32,

    /// Max output tokens per completion
    pub max_tokens: usize,

    /// News feed requests per minute
    pub news_rate_limit: u32,

    /// Timeout for model and news HTTP requests
    pub request_timeout: Duration,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_key: None,
            max_turns: 8,
            temperature: 0.2,
            max_tokens: 2048,
            news_rate_limit: 30,
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl ScoutConfig {
    /// Create a new configuration builder
    pub fn builder() -> ScoutConfigBuilder {
        ScoutConfigBuilder::default()
    }

    /// Load from `SCOUT_*` variables and `GOOGLE_API_KEY`
    pub fn from_env() -> Result<Self> {
        ScoutConfigBuilder::default().with_env()?.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ScoutError::Config("model must not be empty".to_string()));
        }
        if self.max_turns == 0 {
            return Err(ScoutError::Config("max_turns must be greater than 0".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ScoutError::Config(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(ScoutError::Config("max_tokens must be greater than 0".to_string()));
        }
        if self.news_rate_limit == 0 {
            return Err(ScoutError::Config("news_rate_limit must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// Builder for ScoutConfig
#[derive(Debug, Default)]
pub struct ScoutConfigBuilder {
    model: Option<String>,
    api_key: Option<String>,
    max_turns: Option<usize>,
    temperature: Option<f32>,
    max_tokens: Option<usize>,
    news_rate_limit: Option<u32>,
    request_timeout: Option<Duration>,
}

impl ScoutConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn max_turns(mut self, turns: usize) -> Self {
        self.max_turns = Some(turns);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, tokens: usize) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn news_rate_limit(mut self, per_minute: u32) -> Self {
        self.news_rate_limit = Some(per_minute);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Fill unset fields from the environment
    pub fn with_env(mut self) -> Result<Self> {
        if self.model.is_none() {
            self.model = Some(env_or("SCOUT_MODEL", &ScoutConfig::default().model));
        }
        if self.api_key.is_none() {
            self.api_key = env_string("GOOGLE_API_KEY");
        }
        if self.max_turns.is_none() {
            self.max_turns = env_parse("SCOUT_MAX_TURNS")?;
        }
        if self.temperature.is_none() {
            self.temperature = env_parse("SCOUT_TEMPERATURE")?;
        }
        if self.max_tokens.is_none() {
            self.max_tokens = env_parse("SCOUT_MAX_TOKENS")?;
        }
        if self.news_rate_limit.is_none() {
            self.news_rate_limit = env_parse("SCOUT_NEWS_RATE_LIMIT")?;
        }
        if self.request_timeout.is_none() {
            self.request_timeout = env_parse::<u64>("SCOUT_REQUEST_TIMEOUT_SECS")?.map(Duration::from_secs);
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<ScoutConfig> {
        let defaults = ScoutConfig::default();

        let config = ScoutConfig {
            model: self.model.unwrap_or(defaults.model),
            api_key: self.api_key,
            max_turns: self.max_turns.unwrap_or(defaults.max_turns),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            news_rate_limit: self.news_rate_limit.unwrap_or(defaults.news_rate_limit),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScoutConfig::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.max_turns, 8);
        assert_eq!(config.max_tokens, 2048);
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = ScoutConfig::builder()
            .model("gemini-2.5-pro")
            .max_turns(4)
            .request_timeout(Duration::from_secs(30))
            .build()
            .unwrap();

        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.max_turns, 4);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_validation() {
        assert!(ScoutConfig::builder().max_turns(0).build().is_err());
        assert!(ScoutConfig::builder().temperature(2.5).build().is_err());
        assert!(ScoutConfig::builder().temperature(-0.1).build().is_err());
        assert!(ScoutConfig::builder().max_tokens(0).build().is_err());
        assert!(ScoutConfig::builder().news_rate_limit(0).build().is_err());
        assert!(ScoutConfig::builder().model(" ").build().is_err());
    }

    #[test]
    fn test_api_key_not_serialized() {
        let config = ScoutConfig::builder().api_key("secret").build().unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
