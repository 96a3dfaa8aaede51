//! Translation providers.
//!
//! The reconciler only sees the [`Translator`] trait: one string in, one
//! translated string out. [`Provider`] is the closed set of backends selected
//! by the configured provider id; adding a backend means adding a variant here.

mod bedrock;
mod claude;
mod cleanup;
mod openai;

pub use bedrock::BedrockTranslator;
pub use claude::ClaudeTranslator;
pub use cleanup::clean_translation;
pub use openai::OpenAiTranslator;

use crate::config::{Config, ConfigError};
use crate::retry::{with_retry_if, RetryConfig};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use thiserror::Error;

/// A single-string translation capability.
pub trait Translator {
    /// Translate `text` into the language named by `target_language`
    /// (a human-readable name such as "French").
    fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> impl Future<Output = Result<String, ProviderError>>;
}

/// Failure of one translation request.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to send request to {provider}: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("failed to parse {provider} response: {detail}")]
    MalformedResponse {
        provider: &'static str,
        detail: String,
    },

    #[error("{provider} response contained no translation")]
    EmptyCompletion { provider: &'static str },

    #[error("failed to encode {provider} request: {source}")]
    Encode {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{provider} SDK error: {message}")]
    Sdk {
        provider: &'static str,
        message: String,
        retryable: bool,
    },
}

impl ProviderError {
    /// Whether another attempt could succeed: network failures, rate limits
    /// (429) and server errors (5xx). Other 4xx client errors are permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Transport { .. } => true,
            ProviderError::Api { status, .. } => *status == 429 || *status >= 500,
            // Might be a truncated body
            ProviderError::MalformedResponse { .. } => true,
            ProviderError::EmptyCompletion { .. } => false,
            ProviderError::Encode { .. } => false,
            ProviderError::Sdk { retryable, .. } => *retryable,
        }
    }
}

/// Supported provider identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// OpenAI Chat Completions (and compatible servers)
    OpenAi,
    /// Anthropic Messages API
    Claude,
    /// AWS Bedrock model invocation
    Bedrock,
}

impl ProviderKind {
    pub fn id(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Claude => "claude",
            ProviderKind::Bedrock => "bedrock",
        }
    }

    /// Model used when none is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-4o-mini",
            ProviderKind::Claude => "claude-3-5-haiku-latest",
            ProviderKind::Bedrock => "anthropic.claude-3-haiku-20240307-v1:0",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "claude" => Ok(ProviderKind::Claude),
            "bedrock" => Ok(ProviderKind::Bedrock),
            _ => Err(ConfigError::UnsupportedProvider(s.trim().to_string())),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// The configured translation backend.
#[derive(Debug)]
pub enum Provider {
    OpenAi(OpenAiTranslator),
    Claude(ClaudeTranslator),
    Bedrock(BedrockTranslator),
}

impl Provider {
    /// Build the backend named by `config.provider`.
    ///
    /// Fails with a [`ConfigError`] for missing credentials or a model the
    /// backend cannot drive, before any request is sent.
    pub async fn from_config(config: &Config) -> Result<Provider, ConfigError> {
        match config.provider {
            ProviderKind::OpenAi => {
                let api_key = required_api_key(config)?;
                Ok(Provider::OpenAi(OpenAiTranslator::new(
                    http_client(config)?,
                    api_key,
                    config.model.clone(),
                    config.api_base_url.clone(),
                    config.retry.clone(),
                )))
            }
            ProviderKind::Claude => {
                let api_key = required_api_key(config)?;
                Ok(Provider::Claude(ClaudeTranslator::new(
                    http_client(config)?,
                    api_key,
                    config.model.clone(),
                    config.api_base_url.clone(),
                    config.retry.clone(),
                )))
            }
            ProviderKind::Bedrock => Ok(Provider::Bedrock(
                BedrockTranslator::from_settings(
                    &config.aws,
                    config.model.clone(),
                    config.request_timeout,
                    config.retry.clone(),
                )
                .await?,
            )),
        }
    }
}

impl Translator for Provider {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        match self {
            Provider::OpenAi(t) => t.translate(text, target_language).await,
            Provider::Claude(t) => t.translate(text, target_language).await,
            Provider::Bedrock(t) => t.translate(text, target_language).await,
        }
    }
}

fn required_api_key(config: &Config) -> Result<String, ConfigError> {
    config
        .api_key
        .clone()
        .ok_or(ConfigError::MissingCredential("API key (--api-key or AI_API_KEY)"))
}

fn http_client(config: &Config) -> Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| ConfigError::InvalidValue {
            name: "HTTP client",
            value: e.to_string(),
        })
}

/// Build the system prompt for translating one catalog entry
pub(crate) fn build_system_prompt(target_language: &str) -> String {
    format!(
        r#"You are a professional translator for software user interfaces. Translate the user's text into {target_language}.

Rules:
- Reply with the translated text only. No quotes, no explanations, no notes.
- Keep placeholders such as {{name}}, {{{{count}}}}, %s and %d exactly as written.
- Keep HTML tags, Markdown and ICU message syntax intact.
- Keep brand and product names untranslated.
- If the text cannot be translated (e.g. it is a code or a symbol), return it unchanged."#
    )
}

/// Run one backend request under the retry policy and clean up the reply.
pub(crate) async fn translate_with_retry<F, Fut>(
    provider: &'static str,
    retry: &RetryConfig,
    text: &str,
    target_language: &str,
    request: F,
) -> Result<String, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, ProviderError>>,
{
    let raw = with_retry_if(
        retry,
        &format!("{} translation to {}", provider, target_language),
        request,
        ProviderError::is_retryable,
    )
    .await?;

    let cleaned = clean_translation(text, &raw, target_language);
    if cleaned.is_empty() && !text.trim().is_empty() {
        return Err(ProviderError::EmptyCompletion { provider });
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AwsSettings, CliArgs};

    fn config_for(provider: ProviderKind, api_key: Option<&str>) -> Config {
        let mut config = Config::resolve_with(&CliArgs::default(), |_| None).unwrap();
        config.provider = provider;
        config.model = provider.default_model().to_string();
        config.api_key = api_key.map(str::to_string);
        config
    }

    #[test]
    fn test_provider_kind_from_str() {
        assert_eq!("openai".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!(" Claude ".parse::<ProviderKind>().unwrap(), ProviderKind::Claude);
        assert_eq!("BEDROCK".parse::<ProviderKind>().unwrap(), ProviderKind::Bedrock);
    }

    #[test]
    fn test_provider_kind_unknown() {
        let err = "gemini".parse::<ProviderKind>().unwrap_err();
        assert_eq!(err, ConfigError::UnsupportedProvider("gemini".to_string()));
        assert!(err.to_string().contains("openai, claude, bedrock"));
    }

    #[test]
    fn test_provider_kind_display_roundtrip() {
        for kind in [ProviderKind::OpenAi, ProviderKind::Claude, ProviderKind::Bedrock] {
            assert_eq!(kind.to_string().parse::<ProviderKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_system_prompt_mentions_language_and_placeholders() {
        let prompt = build_system_prompt("French");
        assert!(prompt.contains("into French"));
        assert!(prompt.contains("{name}"));
        assert!(prompt.contains("{{count}}"));
        assert!(prompt.contains("%s"));
        assert!(prompt.contains("translated text only"));
    }

    #[test]
    fn test_is_retryable() {
        let api = |status| ProviderError::Api {
            provider: "openai",
            status,
            body: String::new(),
        };
        assert!(api(500).is_retryable());
        assert!(api(503).is_retryable());
        assert!(api(429).is_retryable());
        assert!(!api(400).is_retryable());
        assert!(!api(401).is_retryable());
        assert!(!api(403).is_retryable());
        assert!(!ProviderError::EmptyCompletion { provider: "claude" }.is_retryable());
        assert!(ProviderError::MalformedResponse {
            provider: "claude",
            detail: "eof".to_string()
        }
        .is_retryable());
        assert!(ProviderError::Sdk {
            provider: "bedrock",
            message: "throttled".to_string(),
            retryable: true
        }
        .is_retryable());
    }

    #[tokio::test]
    async fn test_factory_requires_api_key_for_openai() {
        let err = Provider::from_config(&config_for(ProviderKind::OpenAi, None))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential(_)));
    }

    #[tokio::test]
    async fn test_factory_requires_api_key_for_claude() {
        let err = Provider::from_config(&config_for(ProviderKind::Claude, None))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential(_)));
    }

    #[tokio::test]
    async fn test_factory_builds_selected_variant() {
        let openai = Provider::from_config(&config_for(ProviderKind::OpenAi, Some("k")))
            .await
            .unwrap();
        assert!(matches!(openai, Provider::OpenAi(_)));

        let claude = Provider::from_config(&config_for(ProviderKind::Claude, Some("k")))
            .await
            .unwrap();
        assert!(matches!(claude, Provider::Claude(_)));
    }

    #[tokio::test]
    async fn test_factory_rejects_unsupported_bedrock_model() {
        let mut config = config_for(ProviderKind::Bedrock, None);
        config.model = "amazon.titan-text-express-v1".to_string();
        config.aws = AwsSettings {
            access_key_id: Some("AKIA".to_string()),
            secret_access_key: Some("secret".to_string()),
            region: "us-east-1".to_string(),
        };

        let err = Provider::from_config(&config).await.unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedModel { .. }));
    }
}
