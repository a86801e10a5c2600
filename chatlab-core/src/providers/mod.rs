//! Chat model abstraction and concrete providers
//!
//! This module defines the `ChatModel` trait every provider implements, the
//! retrying caller that wraps a model with timeout, retry, and callback
//! handling, and the DeepSeek (OpenAI-compatible) HTTP provider.

pub mod deepseek;
pub mod error;
pub mod options;
pub mod retry;
pub mod stream;

use crate::protocol::Message;
use async_trait::async_trait;
use std::sync::Arc;

pub use deepseek::DeepSeekProvider;
pub use error::{ErrorClass, ProviderError, ProviderResult};
pub use options::ModelOptions;
pub use retry::{CallOptions, CallResult, RetryingChatCaller};
pub use stream::{ChunkStream, MessageStream};

/// A remote chat-completion model
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Identifier of the model requests are sent to
    fn model_name(&self) -> &str;

    /// Produce a complete response for `messages`
    async fn generate(
        &self,
        messages: &[Message],
        options: &ModelOptions,
    ) -> ProviderResult<Message>;

    /// Produce a response incrementally
    async fn stream(
        &self,
        messages: &[Message],
        options: &ModelOptions,
    ) -> ProviderResult<MessageStream>;
}

#[async_trait]
impl<T: ChatModel + ?Sized> ChatModel for Arc<T> {
    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    async fn generate(
        &self,
        messages: &[Message],
        options: &ModelOptions,
    ) -> ProviderResult<Message> {
        (**self).generate(messages, options).await
    }

    async fn stream(
        &self,
        messages: &[Message],
        options: &ModelOptions,
    ) -> ProviderResult<MessageStream> {
        (**self).stream(messages, options).await
    }
}
