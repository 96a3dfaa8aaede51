use super::claude::{MessagesRequest, MessagesResponse};
use super::{translate_with_retry, ProviderError, Translator};
use crate::config::{AwsSettings, ConfigError};
use crate::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_config::retry::RetryConfig as SdkRetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_bedrockruntime::config::Credentials;
use aws_sdk_bedrockruntime::error::{DisplayErrorContext, SdkError};
use aws_sdk_bedrockruntime::operation::invoke_model::InvokeModelError;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::Client;
use std::time::Duration;

const PROVIDER: &str = "bedrock";
const BEDROCK_ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Cross-region inference profiles prefix the model id (`us.anthropic...`).
const INFERENCE_PROFILE_PREFIXES: [&str; 5] = ["us.", "eu.", "apac.", "us-gov.", "global."];

/// Whether the backend knows how to build a request body for `model_id`.
/// Only Anthropic Claude models on Bedrock are supported.
pub fn is_supported_model(model_id: &str) -> bool {
    let base = INFERENCE_PROFILE_PREFIXES
        .iter()
        .find_map(|prefix| model_id.strip_prefix(prefix))
        .unwrap_or(model_id);
    base.starts_with("anthropic.claude")
}

/// AWS Bedrock `InvokeModel` backend.
#[derive(Debug, Clone)]
pub struct BedrockTranslator {
    client: Client,
    model_id: String,
    retry: RetryConfig,
}

impl BedrockTranslator {
    /// Build a client for `model_id` in the configured region.
    ///
    /// Static credentials are used when both the access key and the secret are
    /// configured; otherwise the default AWS credential chain applies.
    pub async fn from_settings(
        aws: &AwsSettings,
        model_id: String,
        timeout: Duration,
        retry: RetryConfig,
    ) -> Result<Self, ConfigError> {
        if !is_supported_model(&model_id) {
            return Err(ConfigError::UnsupportedModel {
                provider: PROVIDER.to_string(),
                model: model_id,
            });
        }

        // Retries are driven by `translate_with_retry`, not by the SDK
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(aws.region.clone()))
            .retry_config(SdkRetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_attempt_timeout(timeout)
                    .build(),
            );

        match (&aws.access_key_id, &aws.secret_access_key) {
            (Some(access_key), Some(secret_key)) => {
                loader = loader.credentials_provider(Credentials::new(
                    access_key.clone(),
                    secret_key.clone(),
                    None,
                    None,
                    "catalog-fill",
                ));
            }
            (None, None) => {}
            (Some(_), None) => {
                return Err(ConfigError::MissingCredential(
                    "AWS secret access key (--aws-secret-key or AWS_SECRET_ACCESS_KEY)",
                ))
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingCredential(
                    "AWS access key id (--aws-access-key or AWS_ACCESS_KEY_ID)",
                ))
            }
        }

        let shared_config = loader.load().await;
        Ok(Self {
            client: Client::new(&shared_config),
            model_id,
            retry,
        })
    }

    async fn request_once(&self, body: &[u8]) -> Result<String, ProviderError> {
        let output = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body.to_vec()))
            .send()
            .await
            .map_err(sdk_error)?;

        parse_response(output.body().as_ref())
    }
}

fn build_body(text: &str, target_language: &str) -> Result<Vec<u8>, ProviderError> {
    let request = MessagesRequest {
        anthropic_version: Some(BEDROCK_ANTHROPIC_VERSION),
        ..MessagesRequest::for_text(text, target_language)
    };
    serde_json::to_vec(&request).map_err(|source| ProviderError::Encode {
        provider: PROVIDER,
        source,
    })
}

fn parse_response(body: &[u8]) -> Result<String, ProviderError> {
    let response: MessagesResponse =
        serde_json::from_slice(body).map_err(|e| ProviderError::MalformedResponse {
            provider: PROVIDER,
            detail: e.to_string(),
        })?;
    response
        .into_text()
        .ok_or(ProviderError::EmptyCompletion { provider: PROVIDER })
}

/// Throttling, service-side failures and anything that never reached the
/// service (timeouts, dispatch errors) are retryable.
fn sdk_error(err: SdkError<InvokeModelError>) -> ProviderError {
    let retryable = match err.as_service_error() {
        Some(service) => {
            service.is_throttling_exception()
                || service.is_service_unavailable_exception()
                || service.is_internal_server_exception()
                || service.is_model_timeout_exception()
                || service.is_model_not_ready_exception()
        }
        None => true,
    };
    ProviderError::Sdk {
        provider: PROVIDER,
        message: DisplayErrorContext(&err).to_string(),
        retryable,
    }
}

impl Translator for BedrockTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        let body = build_body(text, target_language)?;
        translate_with_retry(PROVIDER, &self.retry, text, target_language, || {
            self.request_once(&body)
        })
        .await
    }
}
