//! The language-model collaborator seam

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// A chat-completion backend
///
/// The orchestrator treats implementations as non-deterministic and
/// possibly malformed: every response is parsed defensively before use.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// One request, one reply; no streaming
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Short name used in logs
    fn name(&self) -> &str;
}
