//! Single-completion agent (LLM only, no capabilities)

use async_trait::async_trait;
use scout_core::{Agent, Error, Result};
use scout_llm::{CompletionRequest, LLMProvider, Message, Sampling};
use std::sync::Arc;
use tracing::debug;

/// Configuration for a single-shot responder
#[derive(Debug, Clone)]
pub struct SingleShotConfig {
    /// Model to use
    pub model: String,

    /// Optional system prompt
    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Temperature for sampling
    pub temperature: f32,
}

impl Default for SingleShotConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            system_prompt: None,
            max_tokens: 2048,
            temperature: 0.2,
        }
    }
}

/// Sends one prompt, returns one answer
///
/// Used for follow-up chat, where the prompt already carries all the
/// grounding the model needs and no capability may be called.
pub struct SingleShot {
    provider: Arc<dyn LLMProvider>,
    config: SingleShotConfig,
    name: String,
}

impl SingleShot {
    /// Create a new responder
    pub fn new(provider: Arc<dyn LLMProvider>, config: SingleShotConfig, name: impl Into<String>) -> Self {
        Self {
            provider,
            config,
            name: name.into(),
        }
    }

    /// Get the responder's configuration
    pub fn config(&self) -> &SingleShotConfig {
        &self.config
    }
}

#[async_trait]
impl Agent for SingleShot {
    async fn process(&self, input: String) -> Result<String> {
        let request = CompletionRequest::new(&self.config.model, vec![Message::user(input)])
            .with_system(self.config.system_prompt.clone())
            .with_sampling(Sampling::new(self.config.max_tokens, self.config.temperature));

        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|e| Error::ProcessingFailed(e.to_string()))?;

        let text = response.message.text();
        debug!(agent = %self.name, response_length = text.len(), "Single-shot reply");
        if text.trim().is_empty() {
            return Err(Error::ProcessingFailed("Model returned an empty reply".to_string()));
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_llm::{CompletionResponse, LLMError};
    use std::sync::Mutex;

    struct Echo {
        reply: Option<&'static str>,
        seen: Mutex<Option<CompletionRequest>>,
    }

    #[async_trait]
    impl LLMProvider for Echo {
        async fn complete(&self, request: CompletionRequest) -> scout_llm::Result<CompletionResponse> {
            *self.seen.lock().unwrap() = Some(request);
            self.reply
                .map(CompletionResponse::text)
                .ok_or_else(|| LLMError::UnexpectedResponse("connection reset".to_string()))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    fn responder(reply: Option<&'static str>) -> (SingleShot, Arc<Echo>) {
        let provider = Arc::new(Echo {
            reply,
            seen: Mutex::new(None),
        });
        (
            SingleShot::new(provider.clone(), SingleShotConfig::default(), "chat"),
            provider,
        )
    }

    #[test]
    fn test_config_default() {
        let config = SingleShotConfig::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert!(config.system_prompt.is_none());
        assert_eq!(config.max_tokens, 2048);
    }

    #[tokio::test]
    async fn test_sends_prompt_without_tools() {
        let (agent, provider) = responder(Some("RSI measures momentum."));
        let answer = agent.process("What is RSI?".to_string()).await.unwrap();

        assert_eq!(answer, "RSI measures momentum.");
        assert_eq!(agent.name(), "chat");
        let request = provider.seen.lock().unwrap().clone().unwrap();
        assert!(!request.offers_tools());
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.sampling.temperature, Some(0.2));
    }

    #[tokio::test]
    async fn test_empty_reply_is_an_error() {
        let (agent, _) = responder(Some("  "));
        assert!(matches!(
            agent.process("Why?".to_string()).await,
            Err(Error::ProcessingFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let (agent, _) = responder(None);
        let err = agent.process("Why?".to_string()).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }
}
