//! Parsing raw model output into a closed set of actions
//!
//! Everything non-deterministic about the model stops here: the loop only
//! ever dispatches on [`AgentAction`].

use scout_llm::{CompletionResponse, ContentBlock, StopReason};
use serde_json::Value;

/// What the model asked for on one turn
#[derive(Debug, Clone, PartialEq)]
pub enum AgentAction {
    /// One or more capability calls, to be run in the proposed order
    Invoke(Vec<ProposedCall>),
    /// The synthesized answer; fragments already concatenated
    FinalAnswer(String),
    /// Output that could not be interpreted, with the reason
    Malformed(String),
}

/// How a call reached us
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOrigin {
    /// Native function-calling block
    Structured,
    /// `Action:` / `Action Input:` lines inside plain text
    Text,
}

/// A capability call proposed by the model, not yet validated
#[derive(Debug, Clone, PartialEq)]
pub struct ProposedCall {
    /// Call id used to pair the result with the request
    pub id: String,
    /// Capability name as written by the model
    pub name: String,
    /// Raw argument payload
    pub input: Value,
    /// Where the call came from
    pub origin: CallOrigin,
}

const ACTION: &str = "Action:";
const ACTION_INPUT: &str = "Action Input:";
const FINAL_ANSWER: &str = "Final Answer:";

/// Interpret one completion
pub fn parse_response(response: &CompletionResponse) -> AgentAction {
    let calls: Vec<ProposedCall> = response
        .message
        .tool_uses()
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::ToolUse { id, name, input } => Some(ProposedCall {
                id: id.clone(),
                name: name.clone(),
                input: input.clone(),
                origin: CallOrigin::Structured,
            }),
            _ => None,
        })
        .collect();

    if !calls.is_empty() {
        return AgentAction::Invoke(calls);
    }

    let text = response.message.text();

    match response.stop_reason {
        StopReason::MaxTokens => {
            return AgentAction::Malformed(
                "the reply was cut off at the token limit".to_string(),
            );
        }
        StopReason::ToolUse => {
            return AgentAction::Malformed(
                "a tool call was announced but none was included".to_string(),
            );
        }
        StopReason::EndTurn => {}
    }

    parse_text(&text)
}

fn parse_text(text: &str) -> AgentAction {
    if text.trim().is_empty() {
        return AgentAction::Malformed("the reply was empty".to_string());
    }

    if let Some(answer) = after_marker(text, FINAL_ANSWER) {
        return if answer.trim().is_empty() {
            AgentAction::Malformed("`Final Answer:` was given with no text after it".to_string())
        } else {
            AgentAction::FinalAnswer(answer)
        };
    }

    let action = line_value(text, ACTION);
    let action_input = line_value(text, ACTION_INPUT);

    match (action, action_input) {
        (Some(name), Some(raw_input)) if !name.is_empty() => {
            AgentAction::Invoke(vec![ProposedCall {
                id: format!("text_{}", uuid::Uuid::new_v4().simple()),
                name: name.trim_matches(|c| c == '`' || c == '"').to_string(),
                input: text_input(&raw_input),
                origin: CallOrigin::Text,
            }])
        }
        (Some(name), None) if !name.is_empty() => AgentAction::Malformed(
            "`Action:` was given without an `Action Input:` line".to_string(),
        ),
        (_, Some(_)) => AgentAction::Malformed(
            "`Action Input:` was given without a capability name on an `Action:` line"
                .to_string(),
        ),
        _ => AgentAction::FinalAnswer(text.to_string()),
    }
}

/// Everything after the first line that starts with `marker`
fn after_marker(text: &str, marker: &str) -> Option<String> {
    let mut lines = text.lines();
    while let Some(line) = lines.next() {
        if let Some(rest) = line.trim_start().strip_prefix(marker) {
            let mut answer = rest.trim_start().to_string();
            for tail in lines.by_ref() {
                answer.push('\n');
                answer.push_str(tail);
            }
            return Some(answer.trim().to_string());
        }
    }
    None
}

fn line_value(text: &str, marker: &str) -> Option<String> {
    text.lines()
        .find_map(|line| line.trim_start().strip_prefix(marker))
        .map(|rest| rest.trim().to_string())
}

/// Text-form inputs are usually a bare ticker, sometimes JSON
fn text_input(raw: &str) -> Value {
    let trimmed = raw.trim().trim_matches('`');
    serde_json::from_str::<Value>(trimmed)
        .unwrap_or_else(|_| Value::String(trimmed.trim_matches(|c| c == '"' || c == '\'').to_string()))
}
