//! Incremental response delivery

use crate::protocol::{Message, MessageBuilder, MessageChunk, MessageRole, ResponseMeta};
use crate::providers::{ProviderError, ProviderResult};
use futures::{Stream, StreamExt};
use std::pin::Pin;

/// Boxed stream of response chunks as produced by a provider
pub type ChunkStream = Pin<Box<dyn Stream<Item = ProviderResult<MessageChunk>> + Send>>;

/// Consumer handle over a streamed response.
///
/// `recv` yields chunks until the provider signals the end of the stream,
/// after which it keeps returning `Ok(None)`. Dropping the handle (or calling
/// `close`) releases the underlying connection.
pub struct MessageStream {
    inner: Option<ChunkStream>,
    exhausted: bool,
}

impl MessageStream {
    /// Wrap a provider chunk stream
    pub fn new(stream: impl Stream<Item = ProviderResult<MessageChunk>> + Send + 'static) -> Self {
        Self {
            inner: Some(Box::pin(stream)),
            exhausted: false,
        }
    }

    /// Stream a fixed set of chunks
    pub fn from_chunks(chunks: Vec<MessageChunk>) -> Self {
        Self::new(futures::stream::iter(chunks.into_iter().map(Ok)))
    }

    /// Receive the next chunk; `Ok(None)` means the stream is exhausted
    pub async fn recv(&mut self) -> ProviderResult<Option<MessageChunk>> {
        if self.exhausted {
            return Ok(None);
        }

        let stream = self
            .inner
            .as_mut()
            .ok_or_else(|| ProviderError::Other("stream already closed".to_string()))?;

        match stream.next().await {
            Some(chunk) => chunk.map(Some),
            None => {
                self.exhausted = true;
                self.inner = None;
                Ok(None)
            }
        }
    }

    /// Close the stream, dropping the underlying connection
    pub fn close(&mut self) {
        if self.inner.take().is_some() {
            tracing::debug!("message stream closed before exhaustion");
        }
    }

    /// Whether the provider has signalled the end of the stream
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Drain the stream into a single assistant message
    pub async fn collect_message(mut self) -> ProviderResult<Message> {
        let mut content = String::new();
        let mut reasoning = String::new();
        let mut meta = ResponseMeta::default();

        while let Some(chunk) = self.recv().await? {
            content.push_str(&chunk.content);
            if let Some(delta) = chunk.reasoning_content {
                reasoning.push_str(&delta);
            }
            if chunk.finish_reason.is_some() {
                meta.finish_reason = chunk.finish_reason;
            }
            if chunk.usage.is_some() {
                meta.usage = chunk.usage;
            }
        }

        let mut builder =
            MessageBuilder::new(MessageRole::Assistant, content).with_response_meta(meta);
        if !reasoning.is_empty() {
            builder = builder.with_reasoning(reasoning);
        }
        Ok(builder.build())
    }
}

impl Drop for MessageStream {
    fn drop(&mut self) {
        self.close();
    }
}
