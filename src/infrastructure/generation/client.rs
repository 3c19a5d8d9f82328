//! HTTP generation client.
//!
//! Chat-completions style call against an OpenAI-compatible endpoint.
//! Tries the primary model once; on any failure tries the fallback model
//! once; anything beyond that surfaces as `DomainError::Generation` and is
//! absorbed upstream by the dispatcher's apology fallback.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::GenerationConfig;
use crate::domain::ports::{GenerationClient, GenerationRequest};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Reqwest-backed implementation of the `GenerationClient` port.
pub struct HttpGenerationClient {
    http: reqwest::Client,
    config: GenerationConfig,
    api_key: String,
}

impl HttpGenerationClient {
    /// Build the client. The API key is read from the environment variable
    /// named in config; a missing key is an error here rather than a
    /// surprise at first call.
    pub fn new(config: GenerationConfig) -> DomainResult<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            DomainError::Generation(format!(
                "environment variable {} not set",
                config.api_key_env
            ))
        })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::Generation(format!("http client build failed: {e}")))?;

        Ok(Self {
            http,
            config,
            api_key,
        })
    }

    fn messages(request: &GenerationRequest) -> Vec<ChatMessage> {
        let mut instructions = request.instructions.clone();
        if let Some(digest) = &request.digest {
            instructions.push_str("\n\nRecent conversation:\n");
            instructions.push_str(digest);
        }
        if request.force_short {
            instructions.push_str(
                "\n\nKeep it short and conversational: a few sentences, no lists.",
            );
        }
        vec![
            ChatMessage {
                role: "system".to_string(),
                content: instructions,
            },
            ChatMessage {
                role: "user".to_string(),
                content: request.input.clone(),
            },
        ]
    }

    async fn call_model(&self, model: &str, request: &GenerationRequest) -> DomainResult<String> {
        let body = ChatRequest {
            model,
            messages: Self::messages(request),
            max_tokens: request.force_short.then_some(400),
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::Generation(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DomainError::Generation(format!(
                "model {model} returned {status}: {detail}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Generation(format!("response decode failed: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| DomainError::Generation(format!("model {model} returned no text")))
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn generate(&self, request: GenerationRequest) -> DomainResult<String> {
        match self.call_model(&self.config.model, &request).await {
            Ok(text) => Ok(text),
            Err(error) => {
                warn!(
                    %error,
                    model = %self.config.model,
                    fallback = %self.config.fallback_model,
                    "primary model failed, trying fallback"
                );
                let text = self
                    .call_model(&self.config.fallback_model, &request)
                    .await?;
                debug!(model = %self.config.fallback_model, "fallback model answered");
                Ok(text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_force_short_directive_in_messages() {
        let request = GenerationRequest::new("be helpful", "hello").forced_short();
        let messages = HttpGenerationClient::messages(&request);
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains("Keep it short"));
        assert_eq!(messages[1].content, "hello");
    }

    #[test]
    fn test_digest_folded_into_system_message() {
        let request = GenerationRequest::new("be helpful", "hello")
            .with_digest(Some("User: earlier\nAgent: reply".to_string()));
        let messages = HttpGenerationClient::messages(&request);
        assert!(messages[0].content.contains("Recent conversation:"));
        assert!(messages[0].content.contains("User: earlier"));
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        let config = GenerationConfig {
            api_key_env: "STOA_TEST_KEY_THAT_IS_NOT_SET".to_string(),
            ..GenerationConfig::default()
        };
        assert!(HttpGenerationClient::new(config).is_err());
    }
}
