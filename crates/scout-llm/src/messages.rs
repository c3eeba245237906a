//! Message types for LLM communication
//!
//! A message carries either plain text or a list of content blocks. Blocks
//! cover the three things that travel between the orchestrator and a model:
//! text fragments, capability invocations proposed by the model, and the
//! results sent back.

use serde::{Deserialize, Serialize};

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Content block in a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text fragment
    Text {
        /// Text content
        text: String,
    },

    /// Tool use request from assistant
    ToolUse {
        /// Unique ID for this tool use
        id: String,
        /// Tool name
        name: String,
        /// Tool input parameters (JSON)
        input: serde_json::Value,
    },

    /// Tool result sent back to the model
    ToolResult {
        /// ID of the tool use this is responding to
        tool_use_id: String,
        /// Name of the tool that produced the result
        name: String,
        /// Result content
        content: String,
        /// Whether this is an error result
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

/// Message content: either simple text or structured blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content
    Text(String),
    /// Structured content blocks
    Blocks(Vec<ContentBlock>),
}

/// One turn of the conversation sent to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(MessageContent::Text(text.into())),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(MessageContent::Text(text.into())),
        }
    }

    /// Assistant turn echoed back verbatim, tool calls included
    pub fn assistant_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(MessageContent::Blocks(blocks)),
        }
    }

    /// All results for one batch of calls travel in a single user turn
    pub fn tool_results(results: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content: Some(MessageContent::Blocks(results)),
        }
    }

    /// Concatenate every text fragment in the message
    ///
    /// Models may split a final answer across several text blocks; callers
    /// always get them joined in order.
    pub fn text(&self) -> String {
        self.text_fragments().concat()
    }

    /// Text fragments in order of appearance
    pub fn text_fragments(&self) -> Vec<&str> {
        match &self.content {
            Some(MessageContent::Text(s)) => vec![s.as_str()],
            Some(MessageContent::Blocks(blocks)) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
            None => Vec::new(),
        }
    }

    /// Extract tool use requests from assistant messages
    pub fn tool_uses(&self) -> Vec<&ContentBlock> {
        match &self.content {
            Some(MessageContent::Blocks(blocks)) => blocks
                .iter()
                .filter(|b| matches!(b, ContentBlock::ToolUse { .. }))
                .collect(),
            _ => vec![],
        }
    }

    pub fn has_tool_uses(&self) -> bool {
        !self.tool_uses().is_empty()
    }

    /// Contents of every tool result block, in order
    pub fn tool_result_texts(&self) -> Vec<&str> {
        match &self.content {
            Some(MessageContent::Blocks(blocks)) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::ToolResult { content, .. } => Some(content.as_str()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl ContentBlock {
    pub fn tool_result(
        tool_use_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            name: name.into(),
            content: content.into(),
            is_error: None,
        }
    }

    /// Tool result flagged as an error the model should react to
    pub fn tool_error(
        tool_use_id: impl Into<String>,
        name: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            name: name.into(),
            content: error.into(),
            is_error: Some(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_message() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text(), "Hello");
    }

    #[test]
    fn test_text_fragments_are_concatenated() {
        let msg = Message::assistant_blocks(vec![
            ContentBlock::Text {
                text: "**NVDA** looks ".to_string(),
            },
            ContentBlock::ToolUse {
                id: "call_1".to_string(),
                name: "TechnicalAnalyst".to_string(),
                input: json!({"ticker": "NVDA"}),
            },
            ContentBlock::Text {
                text: "strong.".to_string(),
            },
        ]);

        assert_eq!(msg.text(), "**NVDA** looks strong.");
        assert_eq!(msg.tool_uses().len(), 1);
        assert!(msg.has_tool_uses());
    }

    #[test]
    fn test_empty_message_has_no_text() {
        let msg = Message {
            role: Role::Assistant,
            content: None,
        };
        assert_eq!(msg.text(), "");
        assert!(!msg.has_tool_uses());
    }

    #[test]
    fn test_tool_error_block() {
        let block = ContentBlock::tool_error("call_9", "PriceOracle", "unknown");
        match block {
            ContentBlock::ToolResult { is_error, name, .. } => {
                assert_eq!(is_error, Some(true));
                assert_eq!(name, "PriceOracle");
            }
            _ => panic!("Expected ToolResult"),
        }
    }

    #[test]
    fn test_tool_result_texts() {
        let msg = Message::tool_results(vec![
            ContentBlock::tool_result("call_1", "TechnicalAnalyst", "RSI 55"),
            ContentBlock::tool_error("call_2", "PriceOracle", "unknown capability"),
        ]);
        assert_eq!(msg.tool_result_texts(), vec!["RSI 55", "unknown capability"]);
        assert!(Message::user("hi").tool_result_texts().is_empty());
    }

    #[test]
    fn test_message_serialization() {
        let msg = Message::tool_results(vec![ContentBlock::tool_result(
            "call_1",
            "TechnicalAnalyst",
            "RSI 55",
        )]);
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"tool_result\""));
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }
}
