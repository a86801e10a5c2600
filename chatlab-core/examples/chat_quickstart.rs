//! Quickstart - one chat completion with token usage
//!
//! Reads `DEEPSEEK_API_KEY` (plus optional `DEEPSEEK_MODEL` and
//! `DEEPSEEK_BASE_URL`), asks a single question, and prints the answer.
//!
//! Run with: cargo run --example chat_quickstart

use chatlab_core::config::LabConfig;
use chatlab_core::protocol::Message;
use chatlab_core::providers::{ChatModel, DeepSeekProvider, ModelOptions};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = LabConfig::from_env()?;
    let model = DeepSeekProvider::new(config.provider)?;

    let messages = vec![
        Message::system("You are a helpful assistant who answers concisely."),
        Message::user("Introduce Kobe Bryant in three sentences."),
    ];

    let response = model.generate(&messages, &ModelOptions::default()).await?;

    if let Some(reasoning) = &response.reasoning_content {
        println!("Reasoning:\n{}\n", reasoning);
    }
    println!("Answer:\n{}\n", response.content);

    if let Some(usage) = response.usage() {
        println!(
            "Tokens: prompt={} completion={} total={}",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
    }

    Ok(())
}
