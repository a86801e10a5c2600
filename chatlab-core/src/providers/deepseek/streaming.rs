//! Streaming support for DeepSeek responses

use super::converter::from_deepseek_stream_chunk;
use super::types::DeepSeekStreamChunk;
use crate::providers::{MessageStream, ProviderError};
use bytes::Bytes;
use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};

/// Terminal event data sent after the last chunk
const DONE_MARKER: &str = "[DONE]";

/// Parse a Server-Sent Events body into a message stream.
///
/// The stream ends at the `[DONE]` event; events that fail to parse are
/// logged and skipped.
pub fn parse_stream(
    stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
) -> MessageStream {
    let chunks = stream
        .eventsource()
        .take_while(|result| {
            let done = matches!(result, Ok(event) if event.data.trim() == DONE_MARKER);
            futures::future::ready(!done)
        })
        .filter_map(|result| async move {
            match result {
                Ok(event) => match serde_json::from_str::<DeepSeekStreamChunk>(&event.data) {
                    Ok(chunk) => Some(Ok(from_deepseek_stream_chunk(chunk))),
                    Err(e) => {
                        tracing::warn!("Failed to parse stream chunk: {}", e);
                        None
                    }
                },
                Err(e) => Some(Err(ProviderError::ParseError(format!("Stream error: {}", e)))),
            }
        });

    MessageStream::new(chunks)
}
