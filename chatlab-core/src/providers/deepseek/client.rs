//! DeepSeek client implementation

use super::converter::{from_deepseek_response, to_deepseek_request};
use super::streaming::parse_stream;
use super::types::{DeepSeekError, DeepSeekResponse, DeepSeekStreamOptions};
use crate::config::ProviderSettings;
use crate::protocol::{Message, ToolDefinition};
use crate::providers::{ChatModel, MessageStream, ModelOptions, ProviderError, ProviderResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

/// DeepSeek chat model
pub struct DeepSeekProvider {
    settings: ProviderSettings,
    client: Client,
    tools: Vec<ToolDefinition>,
}

impl std::fmt::Debug for DeepSeekProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepSeekProvider")
            .field("model", &self.settings.model)
            .field("base_url", &self.settings.base_url)
            .field("tools", &self.tools.len())
            .finish()
    }
}

impl DeepSeekProvider {
    /// Create a new DeepSeek provider
    pub fn new(settings: ProviderSettings) -> ProviderResult<Self> {
        if settings.api_key.is_blank() {
            return Err(ProviderError::Configuration(
                "DeepSeek API key is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .default_headers(Self::build_headers(&settings)?)
            .build()
            .map_err(|e| {
                ProviderError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        tracing::debug!(
            model = %settings.model,
            base_url = %settings.base_url,
            api_key = %settings.api_key.partial_redact(),
            "created DeepSeek provider"
        );

        Ok(Self {
            settings,
            client,
            tools: Vec::new(),
        })
    }

    /// Bind tool definitions sent with every request
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Tools bound to this provider
    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    fn build_headers(settings: &ProviderSettings) -> ProviderResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        let mut auth = HeaderValue::from_str(&format!(
            "Bearer {}",
            settings.api_key.expose_secret()
        ))
        .map_err(|_| {
            ProviderError::Configuration("API key contains invalid header characters".to_string())
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(headers)
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    async fn post(&self, body: &impl serde::Serialize) -> ProviderResult<Response> {
        let response = self
            .client
            .post(self.completions_url())
            .json(body)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let retry_after_secs = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        tracing::warn!(status = %status, "DeepSeek request failed");
        Err(handle_error_response(status, &body, retry_after_secs))
    }
}

/// Map a non-success response to a provider error
pub(crate) fn handle_error_response(
    status: StatusCode,
    body: &str,
    retry_after_secs: Option<u64>,
) -> ProviderError {
    let message = serde_json::from_str::<DeepSeekError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Authentication(message),
        StatusCode::PAYMENT_REQUIRED => ProviderError::InsufficientQuota(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimit {
            message,
            retry_after_secs,
        },
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ProviderError::InvalidRequest(message)
        }
        StatusCode::NOT_FOUND => ProviderError::ModelNotFound(message),
        StatusCode::INTERNAL_SERVER_ERROR
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => ProviderError::ServiceUnavailable(message),
        _ => ProviderError::ProviderError {
            code: status.to_string(),
            message,
        },
    }
}

#[async_trait]
impl ChatModel for DeepSeekProvider {
    fn model_name(&self) -> &str {
        &self.settings.model
    }

    async fn generate(
        &self,
        messages: &[Message],
        options: &ModelOptions,
    ) -> ProviderResult<Message> {
        let mut request = to_deepseek_request(&self.settings.model, messages, options, &self.tools);
        request.stream = Some(false);

        tracing::debug!(model = %request.model, messages = messages.len(), "sending chat completion");
        let response: DeepSeekResponse = self.post(&request).await?.json().await?;
        from_deepseek_response(response)
    }

    async fn stream(
        &self,
        messages: &[Message],
        options: &ModelOptions,
    ) -> ProviderResult<MessageStream> {
        let mut request = to_deepseek_request(&self.settings.model, messages, options, &self.tools);
        request.stream = Some(true);
        request.stream_options = Some(DeepSeekStreamOptions {
            include_usage: Some(true),
        });

        tracing::debug!(model = %request.model, messages = messages.len(), "opening chat stream");
        let response = self.post(&request).await?;
        Ok(parse_stream(response.bytes_stream()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_rejected() {
        let err = DeepSeekProvider::new(ProviderSettings::new("")).unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[test]
    fn test_completions_url_trims_slash() {
        let provider = DeepSeekProvider::new(
            ProviderSettings::new("sk-test").with_base_url("http://localhost:9000/"),
        )
        .unwrap();
        assert_eq!(
            provider.completions_url(),
            "http://localhost:9000/chat/completions"
        );
    }

    #[test]
    fn test_error_envelope_mapping() {
        let body = r#"{"error":{"message":"Authentication Fails","type":"authentication_error"}}"#;
        match handle_error_response(StatusCode::UNAUTHORIZED, body, None) {
            ProviderError::Authentication(message) => assert_eq!(message, "Authentication Fails"),
            other => panic!("unexpected error: {:?}", other),
        }

        match handle_error_response(StatusCode::TOO_MANY_REQUESTS, "slow down", Some(3)) {
            ProviderError::RateLimit {
                message,
                retry_after_secs,
            } => {
                assert_eq!(message, "slow down");
                assert_eq!(retry_after_secs, Some(3));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        assert!(matches!(
            handle_error_response(StatusCode::PAYMENT_REQUIRED, "{}", None),
            ProviderError::InsufficientQuota(_)
        ));
        assert!(matches!(
            handle_error_response(StatusCode::SERVICE_UNAVAILABLE, "overloaded", None),
            ProviderError::ServiceUnavailable(_)
        ));
    }

    #[test]
    fn test_debug_hides_key() {
        let provider = DeepSeekProvider::new(ProviderSettings::new("sk-very-secret")).unwrap();
        assert!(!format!("{:?}", provider).contains("sk-very-secret"));
    }
}
