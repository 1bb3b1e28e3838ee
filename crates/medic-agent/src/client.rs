//! Model backend client for locator suggestions
//!
//! One call to [`LocatorSuggester::request_locator_suggestion`] issues exactly
//! one HTTP request. There are no retries here; retrying is the resolver's
//! job, one attempt at a time.

use async_trait::async_trait;
use medic_core::fail_open::fail_open;
use medic_core::{MedicError, ModelConfig, Provider, Result};
use std::time::Duration;

use crate::auth;
use crate::prompt::build_prompt;
use crate::types::{
    ChatMessage, ChatRequest, ChatResponse, GenerateOptions, GenerateRequest, GenerateResponse,
};

/// Fixed chat-completion endpoint for the cloud provider
pub const CLOUD_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Source of replacement locator suggestions
///
/// Implementations never fail: an unavailable backend yields an empty string.
#[async_trait]
pub trait LocatorSuggester: Send + Sync {
    async fn request_locator_suggestion(
        &self,
        page_markup: &str,
        failed_locator: &str,
        element_description: &str,
    ) -> String;
}

/// HTTP client for the configured model backend
///
/// Immutable after construction and safe to share between concurrent
/// resolutions.
#[derive(Debug, Clone)]
pub struct ModelClient {
    config: ModelConfig,
    http: reqwest::Client,
    api_key: Option<String>,
    cloud_endpoint: String,
    timeout: Duration,
}

impl ModelClient {
    /// Create a client for the given configuration
    pub fn new(config: ModelConfig) -> Self {
        let api_key = match config.provider {
            Provider::Cloud => auth::resolve_api_key(config.api_key.as_deref()),
            Provider::Local => config.api_key.clone(),
        };
        let timeout = config.request_timeout();

        Self {
            config,
            http: reqwest::Client::new(),
            api_key,
            cloud_endpoint: CLOUD_COMPLETIONS_URL.to_string(),
            timeout,
        }
    }

    /// Point cloud requests at a different chat-completion endpoint
    pub fn with_cloud_endpoint(mut self, url: impl Into<String>) -> Self {
        self.cloud_endpoint = url.into();
        self
    }

    /// Override the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// URL the local provider posts to
    pub fn generate_url(&self) -> String {
        format!("{}/api/generate", self.config.base_url.trim_end_matches('/'))
    }

    async fn query_local(&self, prompt: String) -> Result<String> {
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        let url = self.generate_url();
        tracing::debug!("Sending suggestion request to {}", url);

        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| MedicError::Backend(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown".to_string());
            return Err(MedicError::Backend(format!(
                "Local backend error {}: {}",
                status, error_text
            )));
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| MedicError::Backend(format!("Failed to parse response: {}", e)))?;

        Ok(generated.response)
    }

    async fn query_cloud(&self, prompt: String) -> Result<String> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        tracing::debug!("Sending suggestion request to {}", self.cloud_endpoint);

        let mut builder = self
            .http
            .post(&self.cloud_endpoint)
            .timeout(self.timeout)
            .json(&request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| MedicError::Backend(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown".to_string());
            return Err(MedicError::Backend(format!(
                "Cloud backend error {}: {}",
                status, error_text
            )));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| MedicError::Backend(format!("Failed to parse response: {}", e)))?;

        completion
            .first_content()
            .map(str::to_string)
            .ok_or_else(|| MedicError::Backend("No content in response".to_string()))
    }
}

#[async_trait]
impl LocatorSuggester for ModelClient {
    async fn request_locator_suggestion(
        &self,
        page_markup: &str,
        failed_locator: &str,
        element_description: &str,
    ) -> String {
        let prompt = build_prompt(
            page_markup,
            failed_locator,
            element_description,
            self.config.max_markup_chars,
        );

        let provider = self.config.provider;
        let operation = format!("model_client[{}]", provider);

        let suggestion = fail_open(&operation, move || async move {
            match provider {
                Provider::Local => self.query_local(prompt).await,
                Provider::Cloud => self.query_cloud(prompt).await,
            }
        })
        .await
        .unwrap_or_default();

        tracing::debug!(
            "Model backend {} returned {} chars for '{}'",
            provider,
            suggestion.len(),
            element_description
        );
        suggestion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_url() {
        let client = ModelClient::new(ModelConfig {
            base_url: "http://x/".to_string(),
            ..ModelConfig::default()
        });
        assert_eq!(client.generate_url(), "http://x/api/generate");

        let client = ModelClient::new(ModelConfig::default());
        assert_eq!(client.generate_url(), "http://localhost:11434/api/generate");
    }

    #[test]
    fn test_builder() {
        let client = ModelClient::new(ModelConfig::default())
            .with_cloud_endpoint("http://proxy/v1/chat/completions")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(client.cloud_endpoint, "http://proxy/v1/chat/completions");
        assert_eq!(client.timeout, Duration::from_secs(5));
        assert_eq!(client.config().model, "llama3");
    }

    #[tokio::test]
    async fn test_unreachable_backend_returns_empty() {
        // Reserve a port, then close it so the request is refused
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let client = ModelClient::new(ModelConfig {
            base_url,
            ..ModelConfig::default()
        })
        .with_timeout(Duration::from_secs(2));

        let suggestion = client
            .request_locator_suggestion("<html></html>", "id=q", "search box")
            .await;
        assert!(suggestion.is_empty());
    }
}
