//! Translation assistant
//!
//! Translates a handful of inputs, reporting failures and moving on.
//!
//! Run with: cargo run --example translate

use chatlab_core::config::API_KEY_VAR;
use chatlab_core::translate::{Translator, TranslatorConfig};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let translator = Translator::new(
        TranslatorConfig::new(std::env::var(API_KEY_VAR).unwrap_or_default())
            .with_model("deepseek-chat")
            .with_timeout(Duration::from_secs(30))
            .with_retries(2),
    )?;

    let inputs = [
        ("Hello, how are you?", "Chinese"),
        ("Eino 是一个强大的 AI 开发框架", "English"),
        ("Les roses sont rouges", "Chinese"),
        ("- item1\n- item2\n", "Chinese"),
    ];

    let cancel = CancellationToken::new();
    for (text, target) in inputs {
        match translator.translate(&cancel, text, target).await {
            Ok(translated) => println!("Source: {}\nTranslation: {}\n", text, translated),
            Err(e) => tracing::error!("translation failed: {}", e),
        }
    }

    Ok(())
}
