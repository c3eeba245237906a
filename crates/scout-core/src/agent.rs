//! The `Agent` seam shared by the orchestrator and chat

use crate::Result;
use async_trait::async_trait;

/// Anything that turns a text instruction into a text answer
///
/// Implemented by the tool-using orchestrator and by the single-shot
/// responder used for grounded chat.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Answer one instruction
    async fn process(&self, input: String) -> Result<String>;

    /// Name used in logs
    fn name(&self) -> &str;
}
