use super::{build_system_prompt, translate_with_retry, ProviderError, Translator};
use crate::retry::RetryConfig;
use serde::{Deserialize, Serialize};

const PROVIDER: &str = "claude";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

/// Anthropic Messages request. Bedrock accepts the same body with
/// `anthropic_version` set and `model` omitted.
#[derive(Debug, Serialize)]
pub(crate) struct MessagesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthropic_version: Option<&'static str>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system: String,
    pub messages: Vec<Message>,
}

impl MessagesRequest {
    pub(crate) fn for_text(text: &str, target_language: &str) -> Self {
        Self {
            model: None,
            anthropic_version: None,
            max_tokens: MAX_TOKENS,
            temperature: 0.3,
            system: build_system_prompt(target_language),
            messages: vec![Message {
                role: "user".to_string(),
                content: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    /// Text of the first `text` content block.
    pub(crate) fn into_text(self) -> Option<String> {
        self.content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
    }
}

/// Anthropic Messages API backend.
#[derive(Debug, Clone)]
pub struct ClaudeTranslator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    retry: RetryConfig,
}

impl ClaudeTranslator {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        model: String,
        base_url: Option<String>,
        retry: RetryConfig,
    ) -> Self {
        let base = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            client,
            api_key,
            model,
            endpoint: format!("{}/v1/messages", base.trim_end_matches('/')),
            retry,
        }
    }

    async fn request_once(&self, request: &MessagesRequest) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", self.api_key.as_str())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: PROVIDER,
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(ProviderError::Api {
                provider: PROVIDER,
                status,
                body,
            });
        }

        let messages: MessagesResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::MalformedResponse {
                    provider: PROVIDER,
                    detail: e.to_string(),
                })?;

        messages
            .into_text()
            .ok_or(ProviderError::EmptyCompletion { provider: PROVIDER })
    }
}

impl Translator for ClaudeTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        let request = MessagesRequest {
            model: Some(self.model.clone()),
            ..MessagesRequest::for_text(text, target_language)
        };
        translate_with_retry(PROVIDER, &self.retry, text, target_language, || {
            self.request_once(&request)
        })
        .await
    }
}
