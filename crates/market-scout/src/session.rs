//! Conversation state: the latest report and its chat log

use crate::model::{AnalysisReport, ChatTurn};
use serde::Serialize;

/// Latest report plus the chat log scoped to it
///
/// A new report supersedes the old one entirely: the log is reset and
/// seeded with a greeting.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScoutSession {
    report: Option<AnalysisReport>,
    chat_log: Vec<ChatTurn>,
}

impl ScoutSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the latest report and start a fresh log with `greeting`
    pub fn install(&mut self, report: AnalysisReport, greeting: impl Into<String>) {
        self.report = Some(report);
        self.reset();
        self.chat_log.push(ChatTurn::assistant(greeting));
    }

    /// Clear the chat log, keeping the report
    pub fn reset(&mut self) {
        self.chat_log.clear();
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        self.report.as_ref()
    }

    pub fn has_report(&self) -> bool {
        self.report.is_some()
    }

    pub fn chat_log(&self) -> &[ChatTurn] {
        &self.chat_log
    }

    /// Append one question/answer exchange
    ///
    /// Ignored when `grounded_on` is no longer the latest report, so a reply
    /// about a superseded report never lands in the new log.
    pub fn record_exchange(
        &mut self,
        grounded_on: &AnalysisReport,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> bool {
        if self.report.as_ref() != Some(grounded_on) {
            return false;
        }
        self.chat_log.push(ChatTurn::user(question));
        self.chat_log.push(ChatTurn::assistant(answer));
        true
    }
}
