//! Tests for the retrying chat caller: attempt counts, backoff timing,
//! deadlines, cancellation, and callback delivery

use async_trait::async_trait;
use chatlab_core::callbacks::{CallbackInput, CallbackOutput, ChatCallback};
use chatlab_core::protocol::{Message, MessageBuilder, MessageRole, ResponseMeta, TokenUsage};
use chatlab_core::providers::{
    CallOptions, ChatModel, MessageStream, ModelOptions, ProviderError, ProviderResult,
    RetryingChatCaller,
};
use proptest::prelude::*;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use test_case::test_case;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// What the scripted model does on one attempt
enum Step {
    Reply(Message),
    Fail(ProviderError),
    Hang(Duration),
}

/// A chat model that replays a script, then repeats its fallback step
struct ScriptedModel {
    script: Mutex<VecDeque<Step>>,
    fallback: fn() -> Step,
    attempts: AtomicU32,
    started_at: Mutex<Vec<Instant>>,
}

impl ScriptedModel {
    fn new(script: Vec<Step>, fallback: fn() -> Step) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            attempts: AtomicU32::new(0),
            started_at: Mutex::new(Vec::new()),
        })
    }

    fn always_failing() -> Arc<Self> {
        Self::new(Vec::new(), || {
            Step::Fail(ProviderError::ServiceUnavailable("overloaded".to_string()))
        })
    }

    fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    fn start_times(&self) -> Vec<Instant> {
        self.started_at.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        _messages: &[Message],
        _options: &ModelOptions,
    ) -> ProviderResult<Message> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.started_at.lock().unwrap().push(Instant::now());

        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(self.fallback);

        match step {
            Step::Reply(message) => Ok(message),
            Step::Fail(error) => Err(error),
            Step::Hang(duration) => {
                tokio::time::sleep(duration).await;
                Ok(Message::assistant("too late"))
            }
        }
    }

    async fn stream(
        &self,
        _messages: &[Message],
        _options: &ModelOptions,
    ) -> ProviderResult<MessageStream> {
        Ok(MessageStream::from_chunks(Vec::new()))
    }
}

fn reply_with_usage(content: &str, total: u32) -> Message {
    MessageBuilder::new(MessageRole::Assistant, content)
        .with_response_meta(ResponseMeta {
            finish_reason: Some("stop".to_string()),
            usage: Some(TokenUsage {
                prompt_tokens: total / 2,
                completion_tokens: total - total / 2,
                total_tokens: total,
            }),
        })
        .build()
}

fn transient() -> ProviderError {
    ProviderError::Network("connection reset".to_string())
}

/// Callback that records every event it sees
struct Recorder {
    label: &'static str,
    events: Arc<Mutex<Vec<String>>>,
}

impl ChatCallback for Recorder {
    fn on_start(&self, input: &CallbackInput<'_>) {
        self.events.lock().unwrap().push(format!(
            "{}:start:{}:{}",
            self.label,
            input.model,
            input.messages.len()
        ));
    }

    fn on_end(&self, output: &CallbackOutput<'_>, error: Option<&ProviderError>) {
        self.events.lock().unwrap().push(format!(
            "{}:end:{}:{}",
            self.label,
            output.attempts,
            if error.is_some() { "err" } else { "ok" }
        ));
    }
}

fn messages() -> Vec<Message> {
    vec![
        Message::system("You are a basketball expert"),
        Message::user("Who is Kobe?"),
    ]
}

#[tokio::test(start_paused = true)]
async fn test_always_failing_exhausts_retries() {
    let model = ScriptedModel::always_failing();
    let caller = RetryingChatCaller::new(model.clone());
    let options = CallOptions::default().with_retry_count(2);

    let result = caller
        .call(&CancellationToken::new(), &messages(), &options)
        .await;

    assert_eq!(model.attempts(), 3);
    assert_eq!(result.attempts, 3);
    assert!(result.message.is_none());
    assert!(matches!(
        result.error,
        Some(ProviderError::ServiceUnavailable(_))
    ));
    assert!(result.latency >= Duration::from_millis(750));
}

#[tokio::test(start_paused = true)]
async fn test_backoff_is_linear() {
    let model = ScriptedModel::always_failing();
    let caller = RetryingChatCaller::new(model.clone());
    let options = CallOptions::default().with_retry_count(3);

    caller
        .call(&CancellationToken::new(), &messages(), &options)
        .await;

    let starts = model.start_times();
    assert_eq!(starts.len(), 4);
    let gaps: Vec<Duration> = starts.windows(2).map(|w| w[1] - w[0]).collect();
    assert_eq!(
        gaps,
        vec![
            Duration::from_millis(250),
            Duration::from_millis(500),
            Duration::from_millis(750),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_fail_once_then_succeed() {
    let model = ScriptedModel::new(
        vec![
            Step::Fail(transient()),
            Step::Reply(reply_with_usage("Kobe Bryant", 42)),
        ],
        || Step::Fail(transient()),
    );
    let caller = RetryingChatCaller::new(model.clone());
    let options = CallOptions::default().with_retry_count(2);

    let result = caller
        .call(&CancellationToken::new(), &messages(), &options)
        .await;

    assert!(result.is_success());
    assert_eq!(result.attempts, 2);
    assert_eq!(model.attempts(), 2);
    assert_eq!(result.usage.map(|u| u.total_tokens), Some(42));
    assert_eq!(result.message.unwrap().content, "Kobe Bryant");
}

#[tokio::test(start_paused = true)]
async fn test_timeout_shorter_than_call() {
    let model = ScriptedModel::new(Vec::new(), || Step::Hang(Duration::from_millis(100)));
    let caller = RetryingChatCaller::new(model.clone());
    let options = CallOptions::default()
        .with_retry_count(2)
        .with_timeout(Duration::from_millis(1));

    let result = caller
        .call(&CancellationToken::new(), &messages(), &options)
        .await;

    assert_eq!(result.attempts, 1);
    assert_eq!(model.attempts(), 1);
    match result.error {
        Some(ProviderError::DeadlineExceeded(budget)) => {
            assert_eq!(budget, Duration::from_millis(1))
        }
        other => panic!("expected deadline error, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_deadline_expires_during_backoff() {
    let model = ScriptedModel::always_failing();
    let caller = RetryingChatCaller::new(model.clone());
    let options = CallOptions::default()
        .with_retry_count(5)
        .with_timeout(Duration::from_millis(400));

    let result = caller
        .call(&CancellationToken::new(), &messages(), &options)
        .await;

    // attempts at 0ms and 250ms, the 500ms backoff crosses the deadline
    assert_eq!(model.attempts(), 2);
    assert!(matches!(
        result.error,
        Some(ProviderError::DeadlineExceeded(_))
    ));
    assert!(result.latency < Duration::from_millis(750));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_during_backoff() {
    let model = ScriptedModel::always_failing();
    let caller = RetryingChatCaller::new(model.clone());
    let options = CallOptions::default().with_retry_count(5);

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let result = caller.call(&token, &messages(), &options).await;

    assert_eq!(model.attempts(), 1);
    assert!(matches!(result.error, Some(ProviderError::Cancelled)));
    assert!(result.latency < Duration::from_millis(250));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_during_inflight_attempt() {
    let model = ScriptedModel::new(Vec::new(), || Step::Hang(Duration::from_secs(10)));
    let caller = RetryingChatCaller::new(model.clone());
    let options = CallOptions::default().with_retry_count(3);

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let result = caller.call(&token, &messages(), &options).await;

    assert_eq!(model.attempts(), 1);
    assert_eq!(result.attempts, 1);
    assert!(matches!(result.error, Some(ProviderError::Cancelled)));
    assert!(result.latency < Duration::from_secs(10));
}

#[tokio::test]
async fn test_already_cancelled_makes_no_attempt() {
    let model = ScriptedModel::always_failing();
    let caller = RetryingChatCaller::new(model.clone());

    let token = CancellationToken::new();
    token.cancel();

    let result = caller
        .call(&token, &messages(), &CallOptions::default().with_retry_count(3))
        .await;

    assert_eq!(model.attempts(), 0);
    assert_eq!(result.attempts, 1);
    assert!(matches!(result.error, Some(ProviderError::Cancelled)));
}

#[tokio::test]
async fn test_configuration_error_not_retried() {
    let model = ScriptedModel::new(Vec::new(), || {
        Step::Fail(ProviderError::Configuration("bad key".to_string()))
    });
    let caller = RetryingChatCaller::new(model.clone());

    let result = caller
        .call(
            &CancellationToken::new(),
            &messages(),
            &CallOptions::default().with_retry_count(4),
        )
        .await;

    assert_eq!(model.attempts(), 1);
    assert!(matches!(result.error, Some(ProviderError::Configuration(_))));
}

#[tokio::test]
async fn test_empty_messages_rejected_without_callbacks() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let model = ScriptedModel::always_failing();
    let caller = RetryingChatCaller::new(model.clone()).with_callback(Recorder {
        label: "a",
        events: events.clone(),
    });

    let result = caller
        .call(&CancellationToken::new(), &[], &CallOptions::default())
        .await;

    assert_eq!(model.attempts(), 0);
    assert_eq!(result.attempts, 0);
    assert!(matches!(result.error, Some(ProviderError::Configuration(_))));
    assert!(events.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_callbacks_fire_once_in_registration_order() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let model = ScriptedModel::new(
        vec![Step::Fail(transient()), Step::Reply(Message::assistant("ok"))],
        || Step::Fail(transient()),
    );
    let caller = RetryingChatCaller::new(model)
        .with_callback(Recorder {
            label: "first",
            events: events.clone(),
        })
        .with_callback(Recorder {
            label: "second",
            events: events.clone(),
        });

    caller
        .call(
            &CancellationToken::new(),
            &messages(),
            &CallOptions::default().with_retry_count(2),
        )
        .await;

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            "first:start:scripted:2",
            "second:start:scripted:2",
            "first:end:2:ok",
            "second:end:2:ok",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_on_end_reports_failure() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let caller = RetryingChatCaller::new(ScriptedModel::always_failing()).with_callback(Recorder {
        label: "log",
        events: events.clone(),
    });

    caller
        .call(
            &CancellationToken::new(),
            &messages(),
            &CallOptions::default().with_retry_count(1),
        )
        .await;

    assert_eq!(
        *events.lock().unwrap(),
        vec!["log:start:scripted:2", "log:end:2:err"]
    );
}

#[tokio::test]
async fn test_model_override_reported_to_callbacks() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let model = ScriptedModel::new(vec![Step::Reply(Message::assistant("ok"))], || {
        Step::Fail(transient())
    });
    let caller = RetryingChatCaller::new(model).with_callback(Recorder {
        label: "cb",
        events: events.clone(),
    });
    let options = CallOptions::default()
        .with_model_options(ModelOptions::default().with_model("deepseek-reasoner"));

    let message = caller
        .generate(&CancellationToken::new(), &messages(), &options)
        .await
        .unwrap();

    assert_eq!(message.content, "ok");
    assert_eq!(events.lock().unwrap()[0], "cb:start:deepseek-reasoner:2");
}

#[test_case(-5, 1 ; "negative retry count means a single attempt")]
#[test_case(0, 1 ; "zero retries")]
#[test_case(1, 2 ; "one retry")]
#[test_case(4, 5 ; "four retries")]
#[tokio::test(start_paused = true)]
async fn test_attempts_for_retry_count(retry_count: i32, expected: u32) {
    let model = ScriptedModel::always_failing();
    let caller = RetryingChatCaller::new(model.clone());

    let result = caller
        .call(
            &CancellationToken::new(),
            &messages(),
            &CallOptions::default().with_retry_count(retry_count),
        )
        .await;

    assert_eq!(result.attempts, expected);
    assert_eq!(model.attempts(), expected);
}

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_always_failing_makes_r_plus_one_attempts(retry_count in -3i32..8) {
        let attempts = paused_runtime().block_on(async {
            let model = ScriptedModel::always_failing();
            let caller = RetryingChatCaller::new(model.clone());
            caller
                .call(
                    &CancellationToken::new(),
                    &messages(),
                    &CallOptions::default().with_retry_count(retry_count),
                )
                .await;
            model.attempts()
        });
        prop_assert_eq!(attempts, retry_count.max(0) as u32 + 1);
    }

    #[test]
    fn prop_success_on_attempt_k_stops(k in 1u32..6, extra in 0i32..3) {
        let retry_count = k as i32 - 1 + extra;
        let (attempts, ok) = paused_runtime().block_on(async {
            let mut script: Vec<Step> = (1..k).map(|_| Step::Fail(transient())).collect();
            script.push(Step::Reply(Message::assistant("done")));
            let model = ScriptedModel::new(script, || Step::Fail(transient()));
            let caller = RetryingChatCaller::new(model.clone());
            let result = caller
                .call(
                    &CancellationToken::new(),
                    &messages(),
                    &CallOptions::default().with_retry_count(retry_count),
                )
                .await;
            (model.attempts(), result.is_success())
        });
        prop_assert!(ok);
        prop_assert_eq!(attempts, k);
    }
}
