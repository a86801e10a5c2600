//! Lifecycle observers for chat calls
//!
//! Observers see each call twice: once before the first attempt and once
//! after the last. They are invoked synchronously, in registration order, and
//! cannot influence control flow.

use crate::protocol::{Message, TokenUsage};
use crate::providers::{CallOptions, ProviderError};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Snapshot handed to observers before the first attempt
#[derive(Debug, Clone, Copy)]
pub struct CallbackInput<'a> {
    /// Correlation id shared by the start and end events of one call
    pub call_id: Uuid,
    /// Model the call is sent to
    pub model: &'a str,
    /// Outbound messages
    pub messages: &'a [Message],
    /// Options the call runs with
    pub options: &'a CallOptions,
}

/// Outcome handed to observers after the final attempt
#[derive(Debug, Clone, Copy)]
pub struct CallbackOutput<'a> {
    /// Correlation id shared by the start and end events of one call
    pub call_id: Uuid,
    /// Response message, if an attempt succeeded
    pub message: Option<&'a Message>,
    /// Token usage from the successful response, if reported
    pub usage: Option<TokenUsage>,
    /// Time since the call started
    pub latency: Duration,
    /// Attempts made
    pub attempts: u32,
}

/// Observer of call lifecycle events
pub trait ChatCallback: Send + Sync {
    /// Called once, before the first attempt
    fn on_start(&self, input: &CallbackInput<'_>);

    /// Called once, after the final attempt; `error` is `None` on success
    fn on_end(&self, output: &CallbackOutput<'_>, error: Option<&ProviderError>);
}

/// Reports call lifecycle events through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingCallback;

impl ChatCallback for LoggingCallback {
    fn on_start(&self, input: &CallbackInput<'_>) {
        info!(
            call_id = %input.call_id,
            model = input.model,
            messages = input.messages.len(),
            retry_count = input.options.retry_count,
            timeout = ?input.options.timeout,
            "chat call started"
        );
        for (i, message) in input.messages.iter().enumerate() {
            debug!(call_id = %input.call_id, "  [{}] role={} content={:?}", i, message.role, message.content);
        }
    }

    fn on_end(&self, output: &CallbackOutput<'_>, error: Option<&ProviderError>) {
        let latency_ms = output.latency.as_millis() as u64;
        if let Some(error) = error {
            warn!(
                call_id = %output.call_id,
                attempts = output.attempts,
                latency_ms,
                "chat call failed: {}",
                error
            );
            return;
        }

        info!(
            call_id = %output.call_id,
            attempts = output.attempts,
            latency_ms,
            "chat call finished"
        );
        if let Some(message) = output.message {
            debug!(call_id = %output.call_id, "assistant: {}", message.content);
        }
        if let Some(usage) = output.usage {
            info!(
                call_id = %output.call_id,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "token usage"
            );
        }
    }
}
