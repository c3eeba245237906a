//! Context-Grounded Chat: follow-up questions answered from the latest report

use crate::error::{Result, ScoutError};
use crate::model::AnalysisReport;
use crate::prompts::Prompts;
use scout_core::Agent;
use std::sync::Arc;
use tracing::{debug, info};

/// Answers questions about a report with one model call and no capabilities
#[derive(Clone)]
pub struct ContextChat {
    responder: Arc<dyn Agent>,
    prompts: Arc<Prompts>,
}

impl ContextChat {
    pub fn new(responder: Arc<dyn Agent>, prompts: Arc<Prompts>) -> Self {
        Self { responder, prompts }
    }

    /// Answer `question` grounded in `report`
    ///
    /// Fails with [`ScoutError::NoContext`] when no report exists yet.
    pub async fn ask(&self, report: Option<&AnalysisReport>, question: &str) -> Result<String> {
        let report = report.ok_or(ScoutError::NoContext)?;
        let question = question.trim();
        if question.is_empty() {
            return Err(ScoutError::Command("Question must not be empty".to_string()));
        }

        let prompt = self.prompts.chat(&report.synthesized_text, question)?;
        debug!(ticker = %report.ticker, prompt_length = prompt.len(), "Grounded chat prompt built");

        let answer = self.responder.process(prompt).await?;
        info!(ticker = %report.ticker, answer_length = answer.len(), "Chat answered");
        Ok(answer)
    }
}
