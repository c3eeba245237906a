//! Google Gemini provider implementation
//!
//! Implements [`LLMProvider`] on top of the `generateContent` endpoint of the
//! Generative Language API, including function calling.
//! See: https://ai.google.dev/api/generate-content
//!
//! ```no_run
//! use scout_llm::{CompletionRequest, LLMProvider, Message};
//! use scout_llm::providers::GeminiProvider;
//!
//! # async fn example() -> scout_llm::Result<()> {
//! let provider = GeminiProvider::from_env()?;
//! let request = CompletionRequest::new("gemini-2.5-flash", vec![Message::user("What is RSI?")]);
//! let response = provider.complete(request).await?;
//! println!("{}", response.message.text());
//! # Ok(())
//! # }
//! ```

use crate::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMError, LLMProvider, Message,
    MessageContent, Result, Role, StopReason, TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the Gemini provider
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key sent in the `x-goog-api-key` header
    pub api_key: String,

    /// Base URL, without the `/models/...` suffix
    pub api_base: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GeminiConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Read `GOOGLE_API_KEY` (and optionally `GEMINI_API_BASE`) from the environment
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY").map_err(|_| {
            LLMError::Config("GOOGLE_API_KEY environment variable not set".to_string())
        })?;
        let mut config = Self::new(api_key);
        if let Ok(base) = std::env::var("GEMINI_API_BASE") {
            config.api_base = base;
        }
        Ok(config)
    }

    /// Override the API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Gemini provider
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a provider with default settings for the given API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(GeminiConfig::new(api_key))
    }

    /// Create a provider from environment variables
    pub fn from_env() -> Result<Self> {
        Self::with_config(GeminiConfig::from_env()?)
    }

    /// Create a provider from an explicit configuration
    pub fn with_config(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LLMError::Config(
                "Gemini API key must not be empty".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.config.api_base, model)
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let model = request.model.clone();
        let body = GeminiRequest::from_completion(&request);
        debug!(contents = body.contents.len(), "Sending request to Gemini API");

        let response = self
            .client
            .post(self.endpoint(&model))
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await?;
            warn!(status, model = %model, "Gemini request failed");
            return Err(LLMError::from_status(status, body, &model));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;

        gemini_response.into_completion()
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

// Wire types for the generateContent endpoint

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTools>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTools {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

impl GeminiRequest {
    fn from_completion(request: &CompletionRequest) -> Self {
        let contents = request.messages.iter().map(content_from_message).collect();

        let system_instruction = request.system.as_ref().map(|system| GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: Some(system.clone()),
                ..Default::default()
            }],
        });

        let tools = if request.offers_tools() {
            vec![GeminiTools {
                function_declarations: request
                    .tools
                    .iter()
                    .map(|d| FunctionDeclaration {
                        name: d.name.clone(),
                        description: d.description.clone(),
                        parameters: d.input_schema.clone(),
                    })
                    .collect(),
            }]
        } else {
            Vec::new()
        };

        Self {
            contents,
            system_instruction,
            tools,
            generation_config: GenerationConfig {
                max_output_tokens: request.sampling.max_tokens,
                temperature: request.sampling.temperature,
            },
        }
    }
}

fn content_from_message(message: &Message) -> GeminiContent {
    let role = match message.role {
        Role::User => "user",
        Role::Assistant => "model",
    };

    let parts = match &message.content {
        None => Vec::new(),
        Some(MessageContent::Text(text)) => vec![GeminiPart {
            text: Some(text.clone()),
            ..Default::default()
        }],
        Some(MessageContent::Blocks(blocks)) => blocks.iter().map(part_from_block).collect(),
    };

    GeminiContent {
        role: Some(role.to_string()),
        parts,
    }
}

fn part_from_block(block: &ContentBlock) -> GeminiPart {
    match block {
        ContentBlock::Text { text } => GeminiPart {
            text: Some(text.clone()),
            ..Default::default()
        },
        ContentBlock::ToolUse { name, input, .. } => GeminiPart {
            function_call: Some(FunctionCall {
                name: name.clone(),
                args: input.clone(),
            }),
            ..Default::default()
        },
        ContentBlock::ToolResult {
            name,
            content,
            is_error,
            ..
        } => {
            let response = if is_error.unwrap_or(false) {
                json!({ "error": content })
            } else {
                json!({ "content": content })
            };
            GeminiPart {
                function_response: Some(FunctionResponse {
                    name: name.clone(),
                    response,
                }),
                ..Default::default()
            }
        }
    }
}

impl GeminiResponse {
    fn into_completion(self) -> Result<CompletionResponse> {
        let usage = self
            .usage_metadata
            .map(|u| TokenUsage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        let Some(candidate) = self.candidates.into_iter().next() else {
            let reason = self
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates returned".to_string());
            return Err(LLMError::Blocked(reason));
        };

        let finish_reason = candidate.finish_reason.unwrap_or_else(|| "STOP".to_string());
        if matches!(
            finish_reason.as_str(),
            "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII"
        ) {
            return Err(LLMError::Blocked(finish_reason));
        }

        let mut blocks = Vec::new();
        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if part.thought.unwrap_or(false) {
                continue;
            }
            if let Some(call) = part.function_call {
                // Gemini does not assign call ids; mint one so results can be paired
                blocks.push(ContentBlock::ToolUse {
                    id: format!("call_{}", uuid::Uuid::new_v4().simple()),
                    name: call.name,
                    input: call.args,
                });
            } else if let Some(text) = part.text {
                blocks.push(ContentBlock::Text { text });
            }
        }

        let has_calls = blocks
            .iter()
            .any(|b| matches!(b, ContentBlock::ToolUse { .. }));

        let stop_reason = match finish_reason.as_str() {
            "MAX_TOKENS" => StopReason::MaxTokens,
            _ if has_calls => StopReason::ToolUse,
            "STOP" => StopReason::EndTurn,
            other => {
                // MALFORMED_FUNCTION_CALL and friends arrive with no usable parts;
                // the orchestrator treats the empty turn as malformed output.
                warn!(finish_reason = other, "Unusual finish reason from Gemini");
                StopReason::EndTurn
            }
        };

        Ok(CompletionResponse {
            message: Message::assistant_blocks(blocks),
            stop_reason,
            usage,
        })
    }
}
