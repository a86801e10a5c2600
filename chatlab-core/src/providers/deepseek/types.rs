//! DeepSeek API types
//!
//! DeepSeek speaks the OpenAI chat-completions format with one addition:
//! reasoning models return their chain of thought in `reasoning_content`.

use serde::{Deserialize, Serialize};

/// Chat completion request
#[derive(Debug, Serialize, Deserialize)]
pub struct DeepSeekRequest {
    pub model: String,
    pub messages: Vec<DeepSeekMessage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<DeepSeekStreamOptions>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<DeepSeekTool>>,
}

/// Message format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepSeekMessage {
    pub role: String,

    #[serde(default)]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<DeepSeekToolCall>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// Function call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepSeekFunctionCall {
    pub name: String,
    pub arguments: String,
}

/// Tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepSeekToolCall {
    pub id: String,

    #[serde(rename = "type")]
    pub tool_type: String,

    pub function: DeepSeekFunctionCall,
}

/// Tool definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepSeekTool {
    #[serde(rename = "type")]
    pub tool_type: String,

    pub function: DeepSeekFunction,
}

/// Function definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepSeekFunction {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

/// Stream options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepSeekStreamOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_usage: Option<bool>,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct DeepSeekResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<DeepSeekChoice>,

    #[serde(default)]
    pub usage: Option<DeepSeekUsage>,
}

/// Response choice
#[derive(Debug, Deserialize)]
pub struct DeepSeekChoice {
    #[serde(default)]
    pub index: usize,
    pub message: DeepSeekMessage,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Usage information
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DeepSeekUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Streaming chunk
#[derive(Debug, Deserialize)]
pub struct DeepSeekStreamChunk {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub choices: Vec<DeepSeekStreamChoice>,

    #[serde(default)]
    pub usage: Option<DeepSeekUsage>,
}

/// Streaming choice
#[derive(Debug, Deserialize)]
pub struct DeepSeekStreamChoice {
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub delta: DeepSeekDelta,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Delta for streaming
#[derive(Debug, Deserialize, Default)]
pub struct DeepSeekDelta {
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub reasoning_content: Option<String>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct DeepSeekError {
    pub error: DeepSeekErrorDetail,
}

/// Error detail
#[derive(Debug, Serialize, Deserialize)]
pub struct DeepSeekErrorDetail {
    pub message: String,

    #[serde(rename = "type", default)]
    pub error_type: Option<String>,

    #[serde(default)]
    pub code: Option<serde_json::Value>,
}
