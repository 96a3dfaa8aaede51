use super::{build_system_prompt, translate_with_retry, ProviderError, Translator};
use crate::retry::RetryConfig;
use serde::{Deserialize, Serialize};

const PROVIDER: &str = "openai";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI Chat Completion request for translation
#[derive(Debug, Serialize)]
struct TranslationRequest {
    model: String,
    messages: Vec<Message>,
    max_completion_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<String>,
}

/// Check if a model is a reasoning model that doesn't support temperature
fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("gpt-5")
        || model.starts_with("o1")
        || model.starts_with("o3")
        || model.starts_with("o4")
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions backend. Works with any server that speaks the OpenAI
/// wire format when `base_url` is overridden.
#[derive(Debug, Clone)]
pub struct OpenAiTranslator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    retry: RetryConfig,
}

impl OpenAiTranslator {
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
            endpoint: format!("{}/chat/completions", base.trim_end_matches('/')),
            retry,
        }
    }

    fn build_request(&self, text: &str, target_language: &str) -> TranslationRequest {
        // Reasoning models don't support temperature - use reasoning_effort instead
        let is_reasoning = is_reasoning_model(&self.model);

        TranslationRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: build_system_prompt(target_language),
                },
                Message {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            max_completion_tokens: if is_reasoning { 4000 } else { 1024 },
            temperature: if is_reasoning { None } else { Some(0.3) },
            reasoning_effort: if is_reasoning {
                Some("low".to_string())
            } else {
                None
            },
        }
    }

    async fn request_once(&self, request: &TranslationRequest) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
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

        let chat_response: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::MalformedResponse {
                    provider: PROVIDER,
                    detail: e.to_string(),
                })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ProviderError::EmptyCompletion { provider: PROVIDER })
    }
}

impl Translator for OpenAiTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        let request = self.build_request(text, target_language);
        translate_with_retry(PROVIDER, &self.retry, text, target_language, || {
            self.request_once(&request)
        })
        .await
    }
}
