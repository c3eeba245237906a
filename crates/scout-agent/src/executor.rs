//! The orchestration loop
//!
//! Start → Deciding → (Invoking → Deciding)* → Done, or Aborted once the
//! turn budget is spent. Malformed output and calls to unknown capabilities
//! never end a run; they are reported back to the model as corrections.

use crate::action::{AgentAction, CallOrigin, ProposedCall, parse_response};
use crate::trace::{CapabilityCall, Trace};
use async_trait::async_trait;
use scout_core::{Agent, Error, Result};
use scout_llm::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMProvider, Message, Sampling,
};
use scout_tools::CapabilityRegistry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Callbacks fired while a run progresses
///
/// Useful for surfacing a "working" indicator to an interactive caller.
#[async_trait]
pub trait RunObserver: Send + Sync {
    /// A Deciding step is about to call the model
    async fn on_turn(&self, _turn: usize, _max_turns: usize) {}

    /// A validated capability is about to run
    async fn on_capability_start(&self, _name: &str, _argument: &str) {}

    /// A capability finished (or was rejected)
    async fn on_capability_done(&self, _call: &CapabilityCall) {}

    /// The model produced unusable output
    async fn on_malformed(&self, _reason: &str) {}

    /// The run produced its final answer
    async fn on_complete(&self, _text: &str) {}
}

/// Observer that ignores every event
pub struct NoOpObserver;

#[async_trait]
impl RunObserver for NoOpObserver {}

/// Configuration for the orchestration loop
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Maximum number of Deciding steps before giving up
    pub max_turns: usize,

    /// Model to use
    pub model: String,

    /// System prompt
    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Temperature
    pub temperature: f32,

    /// Pause before the single retry of a transient provider failure
    pub retry_delay: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_turns: 8,
            model: "gemini-2.5-flash".to_string(),
            system_prompt: None,
            max_tokens: 2048,
            temperature: 0.2,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Synthesized final answer
    pub text: String,
    /// Capability invocations made during the run
    pub trace: Trace,
    /// Deciding steps used
    pub turns: usize,
}

/// Drives the model through capability calls to a final answer
pub struct Orchestrator {
    provider: Arc<dyn LLMProvider>,
    registry: Arc<CapabilityRegistry>,
    config: OrchestratorConfig,
    observer: Arc<dyn RunObserver>,
}

impl Orchestrator {
    /// Create a new orchestrator
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        registry: Arc<CapabilityRegistry>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            provider,
            registry,
            config,
            observer: Arc::new(NoOpObserver),
        }
    }

    /// Start a builder
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    /// Replace the observer
    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run the loop for one instruction
    pub async fn run(&self, instruction: impl Into<String>) -> Result<RunOutcome> {
        self.run_observed(instruction, Arc::clone(&self.observer))
            .await
    }

    /// Run the loop with a per-call observer
    pub async fn run_observed(
        &self,
        instruction: impl Into<String>,
        observer: Arc<dyn RunObserver>,
    ) -> Result<RunOutcome> {
        let mut conversation = vec![Message::user(instruction)];
        let mut trace = Trace::new();
        let tools = self.registry.definitions();
        let max_turns = self.config.max_turns;

        for turn in 1..=max_turns {
            info!(turn, max_turns, "Deciding");
            observer.on_turn(turn, max_turns).await;

            let request = CompletionRequest::new(&self.config.model, conversation.clone())
                .with_system(self.config.system_prompt.clone())
                .with_tools(tools.clone())
                .with_sampling(Sampling::new(self.config.max_tokens, self.config.temperature));

            let response = self.complete(request).await?;

            debug!(
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "Model response received"
            );

            match parse_response(&response) {
                AgentAction::FinalAnswer(text) => {
                    info!(turn, calls = trace.len(), response_length = text.len(), "Run complete");
                    observer.on_complete(&text).await;
                    return Ok(RunOutcome {
                        text,
                        trace,
                        turns: turn,
                    });
                }
                AgentAction::Invoke(calls) => {
                    info!(turn, call_count = calls.len(), "Invoking capabilities");
                    conversation.push(response.message.clone());
                    let feedback = self
                        .invoke_all(&calls, &mut trace, observer.as_ref())
                        .await;
                    conversation.extend(feedback);
                }
                AgentAction::Malformed(reason) => {
                    warn!(turn, reason = %reason, "Malformed model output");
                    observer.on_malformed(&reason).await;
                    let raw = response.message.text();
                    conversation.push(Message::assistant(if raw.trim().is_empty() {
                        "[no usable output]".to_string()
                    } else {
                        raw
                    }));
                    conversation.push(Message::user(self.correction(&reason)));
                }
            }
        }

        warn!(max_turns, calls = trace.len(), "Turn budget exhausted");
        Err(Error::AgentTimeout { max_turns })
    }

    /// One model call; a transient failure (quota, 5xx, timeout) gets one retry
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        match self.provider.complete(request.clone()).await {
            Ok(response) => Ok(response),
            Err(e) if e.is_transient() => {
                warn!(
                    error = %e,
                    delay = ?self.config.retry_delay,
                    "Transient provider failure, retrying once"
                );
                tokio::time::sleep(self.config.retry_delay).await;
                self.provider
                    .complete(request)
                    .await
                    .map_err(|e| Error::ProcessingFailed(e.to_string()))
            }
            Err(e) => Err(Error::ProcessingFailed(e.to_string())),
        }
    }

    /// Invoke proposed calls in order and build the messages that report back
    async fn invoke_all(
        &self,
        calls: &[ProposedCall],
        trace: &mut Trace,
        observer: &dyn RunObserver,
    ) -> Vec<Message> {
        let mut structured = Vec::new();
        let mut messages = Vec::new();

        for call in calls {
            let (record, ok) = self.invoke_one(call, observer).await;

            match call.origin {
                CallOrigin::Structured if ok => structured.push(ContentBlock::tool_result(
                    &call.id,
                    &call.name,
                    &record.output,
                )),
                CallOrigin::Structured => structured.push(ContentBlock::tool_error(
                    &call.id,
                    &call.name,
                    &record.output,
                )),
                CallOrigin::Text => messages.push(Message::user(format!(
                    "Observation from {}:\n{}",
                    call.name, record.output
                ))),
            }

            observer.on_capability_done(&record).await;
            trace.record(record);
        }

        if !structured.is_empty() {
            messages.insert(0, Message::tool_results(structured));
        }
        messages
    }

    async fn invoke_one(&self, call: &ProposedCall, observer: &dyn RunObserver) -> (CapabilityCall, bool) {
        match self.registry.validate(&call.name, &call.input) {
            Ok(validated) => {
                info!(capability = %call.name, argument = %validated.argument, "Invoking capability");
                observer
                    .on_capability_start(&call.name, &validated.argument)
                    .await;

                let start = Instant::now();
                let output = validated.capability.invoke(&validated.argument).await;
                let duration_ms = start.elapsed().as_millis() as u64;

                let preview: String = output.chars().take(300).collect();
                info!(
                    capability = %call.name,
                    duration_ms,
                    output_length = output.len(),
                    output_preview = %preview,
                    "Capability finished"
                );

                (
                    CapabilityCall {
                        capability: call.name.clone(),
                        input: validated.argument,
                        output,
                        rejected: false,
                        duration_ms,
                    },
                    true,
                )
            }
            Err(e) => {
                warn!(capability = %call.name, error = %e, "Capability call rejected");
                (
                    CapabilityCall {
                        capability: call.name.clone(),
                        input: call.input.to_string(),
                        output: format!("Error: {e}"),
                        rejected: true,
                        duration_ms: 0,
                    },
                    false,
                )
            }
        }
    }

    fn correction(&self, reason: &str) -> String {
        format!(
            "Your previous reply could not be used: {reason}. \
             Either call one of the available tools ({}) with a JSON argument like {{\"ticker\": \"TSLA\"}}, \
             or reply with your complete final report as plain text.",
            self.registry.names().join(", ")
        )
    }
}

#[async_trait]
impl Agent for Orchestrator {
    async fn process(&self, input: String) -> Result<String> {
        Ok(self.run(input).await?.text)
    }

    fn name(&self) -> &str {
        "orchestrator"
    }
}

/// Builder for [`Orchestrator`]
pub struct OrchestratorBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    registry: Option<Arc<CapabilityRegistry>>,
    config: OrchestratorConfig,
    observer: Option<Arc<dyn RunObserver>>,
}

impl OrchestratorBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            provider: None,
            registry: None,
            config: OrchestratorConfig::default(),
            observer: None,
        }
    }

    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the capability registry
    pub fn registry(mut self, registry: Arc<CapabilityRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the full configuration
    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the turn budget
    pub fn max_turns(mut self, max: usize) -> Self {
        self.config.max_turns = max;
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the system prompt
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Set the default observer
    pub fn observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Build the orchestrator
    pub fn build(self) -> Result<Orchestrator> {
        let provider = self
            .provider
            .ok_or_else(|| Error::InitializationFailed("Provider not set".to_string()))?;
        let registry = self
            .registry
            .ok_or_else(|| Error::InitializationFailed("Capability registry not set".to_string()))?;
        if self.config.max_turns == 0 {
            return Err(Error::InitializationFailed(
                "max_turns must be greater than 0".to_string(),
            ));
        }

        let orchestrator = Orchestrator::new(provider, registry, self.config);
        Ok(match self.observer {
            Some(observer) => orchestrator.with_observer(observer),
            None => orchestrator,
        })
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_llm::{LLMError, StopReason, TokenUsage};
    use scout_tools::Capability;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider that replays canned responses and remembers every request
    struct Scripted {
        replies: Mutex<VecDeque<CompletionResponse>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl Scripted {
        fn new(replies: Vec<CompletionResponse>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn last_request(&self) -> CompletionRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl LLMProvider for Scripted {
        async fn complete(&self, request: CompletionRequest) -> scout_llm::Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request);
            Ok(self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| CompletionResponse::text("")))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct Counting {
        name: &'static str,
        hits: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl Counting {
        fn new(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                hits: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Capability for Counting {
        async fn invoke(&self, argument: &str) -> String {
            self.hits.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(argument.to_string());
            format!("{} report for {argument}", self.name)
        }

        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "counts invocations"
        }
    }

    fn tool_calls(calls: &[(&str, Value)]) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant_blocks(
                calls
                    .iter()
                    .enumerate()
                    .map(|(i, (name, input))| ContentBlock::ToolUse {
                        id: format!("call_{i}"),
                        name: (*name).to_string(),
                        input: input.clone(),
                    })
                    .collect(),
            ),
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        }
    }

    fn setup(
        replies: Vec<CompletionResponse>,
        max_turns: usize,
    ) -> (Orchestrator, Arc<Scripted>, Arc<Counting>, Arc<Counting>) {
        let provider = Scripted::new(replies);
        let technical = Counting::new("TechnicalAnalyst");
        let news = Counting::new("NewsSentimentAnalyst");
        let registry = CapabilityRegistry::builder()
            .register(technical.clone())
            .register(news.clone())
            .build();
        let orchestrator = Orchestrator::builder()
            .provider(provider.clone())
            .registry(Arc::new(registry))
            .max_turns(max_turns)
            .system_prompt("You are Scout")
            .build()
            .unwrap();
        (orchestrator, provider, technical, news)
    }

    #[test]
    fn test_builder_requires_provider_and_budget() {
        let registry = Arc::new(CapabilityRegistry::builder().build());
        assert!(
            OrchestratorBuilder::new()
                .registry(registry.clone())
                .build()
                .is_err()
        );
        assert!(
            OrchestratorBuilder::new()
                .provider(Scripted::new(vec![]))
                .registry(registry)
                .max_turns(0)
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.max_turns, 8);
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.max_tokens, 2048);
    }

    #[tokio::test]
    async fn test_calls_then_final_answer() {
        let (orchestrator, provider, technical, news) = setup(
            vec![
                tool_calls(&[
                    ("TechnicalAnalyst", json!({"ticker": "TSLA"})),
                    ("NewsSentimentAnalyst", json!({"ticker": "TSLA"})),
                ]),
                CompletionResponse::text("Hold TSLA."),
            ],
            5,
        );

        let outcome = orchestrator
            .run("Analyze TSLA and give me a recommendation.")
            .await
            .unwrap();

        assert_eq!(outcome.text, "Hold TSLA.");
        assert_eq!(outcome.turns, 2);
        assert_eq!(
            outcome.trace.invoked(),
            vec!["TechnicalAnalyst", "NewsSentimentAnalyst"]
        );
        assert_eq!(technical.hits.load(Ordering::SeqCst), 1);
        assert_eq!(news.hits.load(Ordering::SeqCst), 1);

        let request = provider.last_request();
        assert_eq!(request.system.as_deref(), Some("You are Scout"));
        assert_eq!(request.tools.len(), 2);
        // instruction, tool-use turn, both results in one message
        assert_eq!(request.messages.len(), 3);
        match &request.messages[2].content {
            Some(scout_llm::MessageContent::Blocks(blocks)) => assert_eq!(blocks.len(), 2),
            other => panic!("Expected tool result blocks, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_capability_is_recoverable() {
        let (orchestrator, provider, technical, _) = setup(
            vec![
                tool_calls(&[("PriceOracle", json!({"ticker": "TSLA"}))]),
                tool_calls(&[("TechnicalAnalyst", json!({"ticker": "TSLA"}))]),
                CompletionResponse::text("Buy."),
            ],
            5,
        );

        let outcome = orchestrator.run("Analyze TSLA").await.unwrap();

        assert_eq!(outcome.text, "Buy.");
        assert_eq!(outcome.trace.len(), 2);
        assert!(outcome.trace.calls()[0].rejected);
        assert!(outcome.trace.calls()[0].output.contains("Unknown capability"));
        assert_eq!(technical.hits.load(Ordering::SeqCst), 1);

        let second = provider.requests.lock().unwrap()[1].clone();
        let fed_back = serde_json::to_string(&second.messages[2]).unwrap();
        assert!(fed_back.contains("\"is_error\":true"));
    }

    #[tokio::test]
    async fn test_malformed_output_gets_correction() {
        let (orchestrator, provider, _, _) = setup(
            vec![
                CompletionResponse::text("   "),
                CompletionResponse::text("Final Answer: Sell."),
            ],
            3,
        );

        let outcome = orchestrator.run("Analyze ZZZ").await.unwrap();
        assert_eq!(outcome.text, "Sell.");

        let second = provider.last_request();
        assert_eq!(second.messages.len(), 3);
        assert!(second.messages[2].text().contains("could not be used"));
    }

    #[tokio::test]
    async fn test_text_form_call_is_dispatched() {
        let (orchestrator, _, _, news) = setup(
            vec![
                CompletionResponse::text("Action: NewsSentimentAnalyst\nAction Input: NVDA"),
                CompletionResponse::text("Positive outlook."),
            ],
            3,
        );

        let outcome = orchestrator.run("Analyze NVDA").await.unwrap();
        assert_eq!(outcome.text, "Positive outlook.");
        assert_eq!(news.seen.lock().unwrap().as_slice(), ["NVDA".to_string()]);
    }

    #[tokio::test]
    async fn test_budget_exhaustion() {
        let looping: Vec<CompletionResponse> = (0..3)
            .map(|_| tool_calls(&[("TechnicalAnalyst", json!({"ticker": "TSLA"}))]))
            .collect();
        let (orchestrator, _, technical, _) = setup(looping, 3);

        let err = orchestrator.run("Analyze TSLA").await.unwrap_err();
        assert_eq!(err, Error::AgentTimeout { max_turns: 3 });
        assert_eq!(technical.hits.load(Ordering::SeqCst), 3);
    }

    /// Fails `failures` times with `error()`, then answers
    struct Flaky {
        failures: usize,
        error: fn() -> LLMError,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LLMProvider for Flaky {
        async fn complete(&self, _request: CompletionRequest) -> scout_llm::Result<CompletionResponse> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
                Err((self.error)())
            } else {
                Ok(CompletionResponse::text("Hold."))
            }
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    fn flaky_run(failures: usize, error: fn() -> LLMError) -> (Result<RunOutcome>, usize) {
        let provider = Arc::new(Flaky {
            failures,
            error,
            calls: AtomicUsize::new(0),
        });
        let orchestrator = Orchestrator::builder()
            .provider(provider.clone())
            .registry(Arc::new(CapabilityRegistry::builder().build()))
            .config(OrchestratorConfig {
                retry_delay: Duration::ZERO,
                ..OrchestratorConfig::default()
            })
            .build()
            .unwrap();
        let result = tokio_test::block_on(orchestrator.run("Analyze TSLA"));
        (result, provider.calls.load(Ordering::SeqCst))
    }

    #[test]
    fn test_transient_failure_is_retried_once() {
        let (result, calls) = flaky_run(1, || LLMError::RateLimited("quota".to_string()));
        assert_eq!(result.unwrap().text, "Hold.");
        assert_eq!(calls, 2);

        let (result, calls) = flaky_run(2, || LLMError::RateLimited("quota".to_string()));
        assert!(matches!(result, Err(Error::ProcessingFailed(_))));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_permanent_failure_is_not_retried() {
        let (result, calls) = flaky_run(1, || LLMError::Unauthorized);
        assert!(matches!(result, Err(Error::ProcessingFailed(_))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_agent_trait_process() {
        let (orchestrator, _, _, _) = setup(vec![CompletionResponse::text("Hold.")], 2);
        let text = tokio_test::block_on(orchestrator.process("Analyze AAPL".to_string())).unwrap();
        assert_eq!(text, "Hold.");
    }
}
