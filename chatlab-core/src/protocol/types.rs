//! Core protocol types for chat-completion calls
//!
//! These are the provider-agnostic structures exchanged with a chat model:
//! - Role-tagged messages with optional tool-call payloads
//! - Response metadata (finish reason and token usage)
//! - Incremental chunks for streamed responses
//! - Tool definitions that can be bound to a model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions that guide the model's behavior
    System,
    /// User input message
    User,
    /// Assistant (model) response
    Assistant,
    /// Tool result fed back to the model
    Tool,
}

impl MessageRole {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: MessageRole,

    /// Text content of the message
    #[serde(default)]
    pub content: String,

    /// Reasoning text returned by reasoning models (assistant messages only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,

    /// Tool calls (for assistant messages with tool use)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,

    /// Tool call ID (for tool response messages)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Response metadata, present on messages produced by a model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_meta: Option<ResponseMeta>,
}

/// Function call information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Name of the function to call
    pub name: String,

    /// Arguments to the function (usually JSON string)
    pub arguments: String,
}

/// Tool call information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,

    /// Type of tool (usually "function")
    #[serde(rename = "type")]
    pub tool_type: String,

    /// Function information
    pub function: FunctionCall,
}

/// Tool definition for function calling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Type of tool (usually "function")
    #[serde(rename = "type")]
    pub tool_type: String,

    /// Function definition
    pub function: FunctionDefinition,
}

/// Function definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Function name
    pub name: String,

    /// Function description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Parameters schema (JSON Schema)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

impl ToolDefinition {
    /// Create a function tool definition
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: Some(description.into()),
                parameters: Some(parameters),
            },
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,

    /// Tokens in the completion
    pub completion_tokens: u32,

    /// Total tokens used
    pub total_tokens: u32,
}

/// Metadata attached to a model response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    /// Why generation stopped ("stop", "length", "tool_calls", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,

    /// Token usage, when the provider reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// One increment of a streamed response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageChunk {
    /// Role (only in first chunk)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<MessageRole>,

    /// Content delta
    #[serde(default)]
    pub content: String,

    /// Reasoning delta
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,

    /// Finish reason (only in final chunk)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,

    /// Usage (only in final chunk, if the provider sends it)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

// ============================================================================
// Builder and convenience constructors
// ============================================================================

/// Builder for constructing messages
pub struct MessageBuilder {
    role: MessageRole,
    content: String,
    reasoning_content: Option<String>,
    tool_calls: Option<Vec<ToolCall>>,
    tool_call_id: Option<String>,
    response_meta: Option<ResponseMeta>,
}

impl MessageBuilder {
    /// Create a new message builder with role and text content
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            reasoning_content: None,
            tool_calls: None,
            tool_call_id: None,
            response_meta: None,
        }
    }

    /// Set reasoning content
    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning_content = Some(reasoning.into());
        self
    }

    /// Add a tool call
    pub fn with_tool_call(
        mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        self.tool_calls.get_or_insert_with(Vec::new).push(ToolCall {
            id: id.into(),
            tool_type: "function".to_string(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        });
        self
    }

    /// Set response metadata
    pub fn with_response_meta(mut self, meta: ResponseMeta) -> Self {
        self.response_meta = Some(meta);
        self
    }

    /// Build the message
    pub fn build(self) -> Message {
        Message {
            role: self.role,
            content: self.content,
            reasoning_content: self.reasoning_content,
            tool_calls: self.tool_calls,
            tool_call_id: self.tool_call_id,
            response_meta: self.response_meta,
        }
    }
}

impl Message {
    /// Create a plain message with the given role
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        MessageBuilder::new(role, content).build()
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        MessageBuilder::new(MessageRole::System, content).build()
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        MessageBuilder::new(MessageRole::User, content).build()
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        MessageBuilder::new(MessageRole::Assistant, content).build()
    }

    /// Create a tool response message
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut msg = MessageBuilder::new(MessageRole::Tool, content).build();
        msg.tool_call_id = Some(tool_call_id.into());
        msg
    }

    /// Token usage reported with this message, if any
    pub fn usage(&self) -> Option<TokenUsage> {
        self.response_meta.as_ref().and_then(|meta| meta.usage)
    }

    /// Finish reason reported with this message, if any
    pub fn finish_reason(&self) -> Option<&str> {
        self.response_meta
            .as_ref()
            .and_then(|meta| meta.finish_reason.as_deref())
    }
}

impl From<&str> for Message {
    fn from(content: &str) -> Self {
        Message::user(content)
    }
}

impl From<String> for Message {
    fn from(content: String) -> Self {
        Message::user(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        assert_eq!(MessageRole::Tool.to_string(), "tool");
    }

    #[test]
    fn test_tool_message_carries_call_id() {
        let msg = Message::tool("call_1", "{\"ok\":true}");
        assert_eq!(msg.role, MessageRole::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn test_usage_accessor() {
        let msg = MessageBuilder::new(MessageRole::Assistant, "hi")
            .with_response_meta(ResponseMeta {
                finish_reason: Some("stop".to_string()),
                usage: Some(TokenUsage {
                    prompt_tokens: 3,
                    completion_tokens: 1,
                    total_tokens: 4,
                }),
            })
            .build();

        assert_eq!(msg.usage().map(|u| u.total_tokens), Some(4));
        assert_eq!(msg.finish_reason(), Some("stop"));
        assert_eq!(Message::user("x").usage(), None);
    }

    #[test]
    fn test_optional_fields_skipped() {
        let json = serde_json::to_value(Message::system("be brief")).unwrap();
        assert_eq!(json["role"], "system");
        assert!(json.get("tool_calls").is_none());
        assert!(json.get("response_meta").is_none());
    }
}
