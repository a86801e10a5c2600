//! Retrying, observable chat calls
//!
//! `RetryingChatCaller` wraps a `ChatModel` with:
//! - an optional per-call deadline layered on the caller's cancellation token
//! - a bounded number of sequential retries with linear, unjittered backoff
//! - start/end notifications to every registered `ChatCallback`
//!
//! Both suspension points of a call (the in-flight request and the backoff
//! sleep) race the cancellation scope, so a cancelled or expired call returns
//! promptly without issuing further attempts.

use crate::callbacks::{CallbackInput, CallbackOutput, ChatCallback};
use crate::protocol::{Message, TokenUsage};
use crate::providers::{ChatModel, ModelOptions, ProviderError, ProviderResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default delay unit for linear backoff
pub const DEFAULT_BACKOFF_STEP: Duration = Duration::from_millis(250);

/// Per-call configuration for the retrying caller
#[derive(Debug, Clone, PartialEq)]
pub struct CallOptions {
    /// Retries after the first attempt. Negative values mean no retries.
    pub retry_count: i32,

    /// Time budget for the whole call. `Duration::ZERO` means no deadline.
    pub timeout: Duration,

    /// Delay unit for backoff; retry `i` waits `i * backoff_step`
    pub backoff_step: Duration,

    /// Generic model options for this call
    pub model: ModelOptions,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            retry_count: 0,
            timeout: Duration::ZERO,
            backoff_step: DEFAULT_BACKOFF_STEP,
            model: ModelOptions::default(),
        }
    }
}

impl CallOptions {
    /// Set the retry count
    pub fn with_retry_count(mut self, retry_count: i32) -> Self {
        self.retry_count = retry_count;
        self
    }

    /// Set the call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the backoff step
    pub fn with_backoff_step(mut self, backoff_step: Duration) -> Self {
        self.backoff_step = backoff_step;
        self
    }

    /// Set the generic model options
    pub fn with_model_options(mut self, model: ModelOptions) -> Self {
        self.model = model;
        self
    }

    /// Retry count clamped to zero
    pub fn retries(&self) -> u32 {
        self.retry_count.max(0) as u32
    }

    /// The call deadline, if one applies
    pub fn deadline_budget(&self) -> Option<Duration> {
        (!self.timeout.is_zero()).then_some(self.timeout)
    }

    /// Delay before retry `retry` (1-indexed)
    pub fn backoff_before_retry(&self, retry: u32) -> Duration {
        self.backoff_step.saturating_mul(retry)
    }
}

/// Outcome of a retrying call
#[derive(Debug)]
pub struct CallResult {
    /// Response from the successful attempt
    pub message: Option<Message>,

    /// Token usage of the successful response, if the provider reported it
    pub usage: Option<TokenUsage>,

    /// Time from the start of the call to its end
    pub latency: Duration,

    /// Attempts issued (the first attempt included)
    pub attempts: u32,

    /// The last error, `None` on success
    pub error: Option<ProviderError>,
}

impl CallResult {
    fn rejected(error: ProviderError) -> Self {
        Self {
            message: None,
            usage: None,
            latency: Duration::ZERO,
            attempts: 0,
            error: Some(error),
        }
    }

    /// Whether an attempt succeeded
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.message.is_some()
    }

    /// Convert into the response message or the final error
    pub fn into_result(self) -> ProviderResult<Message> {
        match (self.message, self.error) {
            (_, Some(error)) => Err(error),
            (Some(message), None) => Ok(message),
            (None, None) => Err(ProviderError::Other("call produced no response".to_string())),
        }
    }
}

/// Cancellation scope of a single call.
///
/// With a deadline the scope owns a child token of the caller's token, which
/// is cancelled when the scope is dropped. Without one it shares the caller's
/// token.
struct CallScope {
    token: CancellationToken,
    deadline: Option<(Instant, Duration)>,
    _release: Option<DropGuard>,
}

impl CallScope {
    fn new(parent: &CancellationToken, budget: Option<Duration>) -> Self {
        match budget {
            Some(budget) => {
                let token = parent.child_token();
                Self {
                    _release: Some(token.clone().drop_guard()),
                    token,
                    deadline: Some((Instant::now() + budget, budget)),
                }
            }
            None => Self {
                token: parent.clone(),
                deadline: None,
                _release: None,
            },
        }
    }

    /// The reason the scope is no longer live, if any
    fn interruption(&self) -> Option<ProviderError> {
        if self.token.is_cancelled() {
            return Some(ProviderError::Cancelled);
        }
        match self.deadline {
            Some((at, budget)) if Instant::now() >= at => {
                Some(ProviderError::DeadlineExceeded(budget))
            }
            _ => None,
        }
    }

    async fn expired(&self) -> Duration {
        match self.deadline {
            Some((at, budget)) => {
                tokio::time::sleep_until(at).await;
                budget
            }
            None => std::future::pending().await,
        }
    }

    /// Run `fut` unless the scope is cancelled or expires first
    async fn run<T, F>(&self, fut: F) -> ProviderResult<T>
    where
        F: Future<Output = ProviderResult<T>>,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(ProviderError::Cancelled),
            budget = self.expired() => Err(ProviderError::DeadlineExceeded(budget)),
            result = fut => result,
        }
    }

    async fn sleep(&self, delay: Duration) -> ProviderResult<()> {
        self.run(async {
            tokio::time::sleep(delay).await;
            Ok(())
        })
        .await
    }
}

/// Wraps a chat model with timeout, retry, and lifecycle callbacks
pub struct RetryingChatCaller<M> {
    model: M,
    callbacks: Vec<Arc<dyn ChatCallback>>,
    defaults: ModelOptions,
}

impl<M: ChatModel> RetryingChatCaller<M> {
    /// Create a caller with no callbacks
    pub fn new(model: M) -> Self {
        Self {
            model,
            callbacks: Vec::new(),
            defaults: ModelOptions::default(),
        }
    }

    /// Register an observer; observers run in registration order
    pub fn with_callback(mut self, callback: impl ChatCallback + 'static) -> Self {
        self.callbacks.push(Arc::new(callback));
        self
    }

    /// Register a shared observer
    pub fn with_shared_callback(mut self, callback: Arc<dyn ChatCallback>) -> Self {
        self.callbacks.push(callback);
        self
    }

    /// Model options applied to every call beneath per-call options
    pub fn with_default_options(mut self, defaults: ModelOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// The wrapped model
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Call the model, retrying transient failures.
    ///
    /// The returned result carries the response or the last error. An empty
    /// message list is rejected before any attempt and before any callback.
    pub async fn call(
        &self,
        cancel: &CancellationToken,
        messages: &[Message],
        options: &CallOptions,
    ) -> CallResult {
        if messages.is_empty() {
            return CallResult::rejected(ProviderError::Configuration(
                "no messages to send".to_string(),
            ));
        }

        let start = Instant::now();
        let scope = CallScope::new(cancel, options.deadline_budget());
        let call_id = Uuid::new_v4();
        let model_options = self.defaults.merged_with(&options.model);
        let model_name = model_options
            .model
            .as_deref()
            .unwrap_or_else(|| self.model.model_name());

        let input = CallbackInput {
            call_id,
            model: model_name,
            messages,
            options,
        };
        for callback in &self.callbacks {
            callback.on_start(&input);
        }

        let retries = options.retries();
        let mut attempts = 0;
        let mut message = None;
        let mut last_error = None;

        for attempt in 0..=retries {
            attempts += 1;
            debug!(%call_id, attempt = attempts, "sending chat request");

            match scope.run(self.model.generate(messages, &model_options)).await {
                Ok(response) => {
                    message = Some(response);
                    last_error = None;
                    break;
                }
                Err(error) => {
                    warn!(%call_id, attempt = attempts, "chat attempt failed: {}", error);
                    let stop = !error.is_retryable() || scope.interruption().is_some();
                    last_error = Some(error);
                    if stop || attempt == retries {
                        break;
                    }

                    let delay = options.backoff_before_retry(attempt + 1);
                    info!(%call_id, delay_ms = delay.as_millis() as u64, "backing off before retry");
                    if let Err(interrupted) = scope.sleep(delay).await {
                        warn!(%call_id, "retry abandoned: {}", interrupted);
                        last_error = Some(interrupted);
                        break;
                    }
                }
            }
        }

        let usage = message.as_ref().and_then(Message::usage);
        let latency = start.elapsed();

        let output = CallbackOutput {
            call_id,
            message: message.as_ref(),
            usage,
            latency,
            attempts,
        };
        for callback in &self.callbacks {
            callback.on_end(&output, last_error.as_ref());
        }

        CallResult {
            message,
            usage,
            latency,
            attempts,
            error: last_error,
        }
    }

    /// Call the model and return the response or the final error
    pub async fn generate(
        &self,
        cancel: &CancellationToken,
        messages: &[Message],
        options: &CallOptions,
    ) -> ProviderResult<Message> {
        self.call(cancel, messages, options).await.into_result()
    }
}
