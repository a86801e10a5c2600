//! Call options and callbacks
//!
//! Wraps the model in a `RetryingChatCaller` with two retries, a 12 second
//! budget, and a `LoggingCallback`. Run with `RUST_LOG=info` to see the
//! start and end events.
//!
//! Run with: RUST_LOG=info cargo run --example option_callback

use chatlab_core::callbacks::LoggingCallback;
use chatlab_core::config::LabConfig;
use chatlab_core::protocol::Message;
use chatlab_core::providers::{CallOptions, DeepSeekProvider, ModelOptions, RetryingChatCaller};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = LabConfig::from_env()?;
    let caller = RetryingChatCaller::new(DeepSeekProvider::new(config.provider)?)
        .with_callback(LoggingCallback);

    let options = CallOptions::default()
        .with_retry_count(2)
        .with_timeout(Duration::from_secs(12))
        .with_model_options(ModelOptions::default().with_temperature(0.7));

    let messages = vec![
        Message::system("You are a basketball expert."),
        Message::user("How many championships did Kobe Bryant win?"),
    ];

    let result = caller
        .call(&CancellationToken::new(), &messages, &options)
        .await;

    println!("attempts: {}, latency: {:?}", result.attempts, result.latency);
    if let Some(usage) = result.usage {
        println!("tokens: {}", usage.total_tokens);
    }

    let message = result.into_result()?;
    println!("\n{}", message.content);

    Ok(())
}
