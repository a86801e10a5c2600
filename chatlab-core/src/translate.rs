//! Translation assistant built on the retrying caller

use crate::config::{ProviderSettings, SecretString, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::prompt::{ChatTemplate, PromptError, PromptVariables};
use crate::protocol::Message;
use crate::providers::{
    CallOptions, ChatModel, DeepSeekProvider, ProviderError, RetryingChatCaller,
};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Call timeout used when none is configured
pub const DEFAULT_TRANSLATE_TIMEOUT: Duration = Duration::from_secs(30);

/// Backoff unit between translation retries
pub const TRANSLATE_BACKOFF_STEP: Duration = Duration::from_millis(300);

const SYSTEM_PROMPT: &str = "You are a professional translation engine. \
Translate the user's input into {target_language}. \
Output only the translation without explanations. \
Keep the original line breaks and list formatting. \
Do not add quotes or any extra content.";

/// Errors from the translator
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("missing api key")]
    MissingApiKey,

    #[error("empty text")]
    EmptyText,

    #[error("empty target language")]
    EmptyTargetLanguage,

    #[error("failed to build prompt: {0}")]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl TranslateError {
    /// Whether the error was raised before any request was made
    pub fn is_configuration(&self) -> bool {
        match self {
            TranslateError::Provider(e) => matches!(e, ProviderError::Configuration(_)),
            _ => true,
        }
    }
}

/// Translator settings; zero or empty fields fall back to defaults
#[derive(Debug, Clone, Default)]
pub struct TranslatorConfig {
    pub api_key: SecretString,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub retries: i32,
}

impl TranslatorConfig {
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: i32) -> Self {
        self.retries = retries;
        self
    }

    /// Fill in defaults for unset fields
    fn normalized(mut self) -> Self {
        if self.model.trim().is_empty() {
            self.model = DEFAULT_MODEL.to_string();
        }
        if self.base_url.trim().is_empty() {
            self.base_url = DEFAULT_BASE_URL.to_string();
        }
        if self.timeout.is_zero() {
            self.timeout = DEFAULT_TRANSLATE_TIMEOUT;
        }
        self.retries = self.retries.max(0);
        self
    }

    fn call_options(&self) -> CallOptions {
        CallOptions::default()
            .with_retry_count(self.retries)
            .with_timeout(self.timeout)
            .with_backoff_step(TRANSLATE_BACKOFF_STEP)
    }
}

/// Translates text into a target language with a chat model
pub struct Translator<M = DeepSeekProvider> {
    caller: RetryingChatCaller<M>,
    template: ChatTemplate,
    options: CallOptions,
}

impl Translator<DeepSeekProvider> {
    /// Build a translator backed by DeepSeek
    pub fn new(config: TranslatorConfig) -> Result<Self, TranslateError> {
        if config.api_key.is_blank() {
            return Err(TranslateError::MissingApiKey);
        }
        let config = config.normalized();

        let settings = ProviderSettings::new(config.api_key.clone())
            .with_model(config.model.clone())
            .with_base_url(config.base_url.clone());
        let provider = DeepSeekProvider::new(settings)?;

        Ok(Self::from_parts(provider, &config))
    }
}

impl<M: ChatModel> Translator<M> {
    /// Build a translator over an existing model
    pub fn with_model(model: M, config: TranslatorConfig) -> Self {
        Self::from_parts(model, &config.normalized())
    }

    fn from_parts(model: M, config: &TranslatorConfig) -> Self {
        Self {
            caller: RetryingChatCaller::new(model),
            template: ChatTemplate::new()
                .system(SYSTEM_PROMPT)
                .placeholder("input", false),
            options: config.call_options(),
        }
    }

    /// Options every translation call runs with
    pub fn call_options(&self) -> &CallOptions {
        &self.options
    }

    /// Translate `text` into `target_language`
    pub async fn translate(
        &self,
        cancel: &CancellationToken,
        text: &str,
        target_language: &str,
    ) -> Result<String, TranslateError> {
        let text = text.trim();
        let target_language = target_language.trim();
        if text.is_empty() {
            return Err(TranslateError::EmptyText);
        }
        if target_language.is_empty() {
            return Err(TranslateError::EmptyTargetLanguage);
        }

        let variables = PromptVariables::new()
            .with("target_language", target_language)
            .with_messages("input", vec![Message::user(text)]);
        let messages = self.template.format(&variables)?;

        let response = self.caller.generate(cancel, &messages, &self.options).await?;
        Ok(response.content.trim().to_string())
    }
}
