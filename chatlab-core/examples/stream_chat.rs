//! Streaming chat - print the answer as it arrives
//!
//! Run with: cargo run --example stream_chat

use chatlab_core::config::ProviderSettings;
use chatlab_core::protocol::Message;
use chatlab_core::providers::{ChatModel, DeepSeekProvider, ModelOptions};
use std::io::Write;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let model = DeepSeekProvider::new(ProviderSettings::from_env()?)?;

    let messages = vec![
        Message::system("You are a thoughtful philosopher."),
        Message::user("What is the meaning of life? Answer in one paragraph."),
    ];

    let mut stream = model.stream(&messages, &ModelOptions::default()).await?;
    let mut stdout = std::io::stdout();

    while let Some(chunk) = stream.recv().await? {
        print!("{}", chunk.content);
        stdout.flush()?;

        if let Some(usage) = chunk.usage {
            println!("\n\n[{} tokens]", usage.total_tokens);
        }
    }
    println!();

    Ok(())
}
