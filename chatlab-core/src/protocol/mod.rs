//! Protocol module for chat messages and responses
//!
//! This module defines the provider-agnostic data model shared by the chat
//! providers, the retrying caller, and the prompt templates.

pub mod types;

pub use types::{
    FunctionCall, FunctionDefinition, Message, MessageBuilder, MessageChunk, MessageRole,
    ResponseMeta, TokenUsage, ToolCall, ToolDefinition,
};
