//! Prompt templates - format messages from variables, then ask the model
//!
//! Run with: cargo run --example prompt_template

use chatlab_core::config::LabConfig;
use chatlab_core::prompt::{ChatTemplate, PromptVariables};
use chatlab_core::protocol::Message;
use chatlab_core::providers::{DeepSeekProvider, RetryingChatCaller};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let template = ChatTemplate::new()
        .system("You are {role}. Your specialty is {expertise}.")
        .placeholder("histories", true)
        .user("My question: {question}");

    let variables = PromptVariables::new()
        .with("role", "a programmer who studies philosophy")
        .with("expertise", "reasoning about trade-offs under uncertainty")
        .with("question", "How do you make the best decision in an uncertain environment?")
        .with_messages(
            "histories",
            vec![
                Message::user("Do you like sport?"),
                Message::assistant("Yes, running keeps my head clear."),
            ],
        );

    let messages = template.format(&variables)?;
    println!("Formatted messages:");
    for (i, message) in messages.iter().enumerate() {
        println!("{}. [{}] {}", i + 1, message.role, message.content);
    }

    let config = LabConfig::from_env()?;
    let options = config.call.to_call_options();
    let caller = RetryingChatCaller::new(DeepSeekProvider::new(config.provider)?);

    let response = caller
        .generate(&CancellationToken::new(), &messages, &options)
        .await?;
    println!("\nAnswer:\n{}", response.content);

    Ok(())
}
