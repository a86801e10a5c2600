//! Chatlab Core Library
//!
//! Chat-completion calls with timeouts, bounded retries, and lifecycle
//! callbacks, plus the DeepSeek provider, configuration loading, prompt
//! templates, and a translation assistant built on top of them.

pub mod callbacks;
pub mod config;
pub mod prompt;
pub mod protocol;
pub mod providers;
pub mod translate;

pub use callbacks::{CallbackInput, CallbackOutput, ChatCallback, LoggingCallback};
pub use config::{ConfigError, LabConfig, ProviderSettings};
pub use prompt::{ChatTemplate, PromptError, PromptVariables};
pub use protocol::{Message, MessageChunk, MessageRole, TokenUsage};
pub use providers::{
    CallOptions, CallResult, ChatModel, DeepSeekProvider, MessageStream, ModelOptions,
    ProviderError, ProviderResult, RetryingChatCaller,
};
pub use translate::{TranslateError, Translator, TranslatorConfig};

/// Returns the version of the Chatlab Core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
