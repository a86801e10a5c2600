//! DeepSeek provider implementation
//!
//! Adapter for the DeepSeek chat-completions API, translating between
//! chatlab's protocol types and DeepSeek's OpenAI-compatible wire format.

mod client;
pub mod converter;
mod streaming;
pub mod types;

pub use client::DeepSeekProvider;
pub use types::{DeepSeekRequest, DeepSeekResponse, DeepSeekStreamChunk};
