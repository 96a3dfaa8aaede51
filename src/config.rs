use crate::i18n::{parse_locale_list, LocaleId};
use crate::provider::ProviderKind;
use crate::retry::RetryConfig;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Setup-time configuration problems. Any of these aborts the run before a
/// catalog is written.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported provider '{0}' (expected one of: openai, claude, bedrock)")]
    UnsupportedProvider(String),

    #[error("model '{model}' is not supported by the {provider} provider")]
    UnsupportedModel { provider: String, model: String },

    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("invalid locale identifier '{0}'")]
    InvalidLocale(String),

    #[error("invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

/// Command-line flags. Every flag is optional; unset flags fall back to the
/// environment and then to built-in defaults (see [`Config::resolve`]).
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "catalog-fill",
    about = "Fill missing keys in JSON locale catalogs with machine translations"
)]
pub struct CliArgs {
    /// Comma-separated list of target languages (e.g., fr,es,de)
    #[arg(short = 'l', long)]
    pub languages: Option<String>,

    /// API key for the selected provider
    #[arg(short = 'k', long)]
    pub api_key: Option<String>,

    /// AI provider (openai, claude, or bedrock)
    #[arg(short = 'p', long)]
    pub provider: Option<String>,

    /// Model to use for translations
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Directory containing locale files
    #[arg(short = 'd', long)]
    pub locales_dir: Option<PathBuf>,

    /// Override the provider endpoint (e.g. an OpenAI-compatible server)
    #[arg(long)]
    pub base_url: Option<String>,

    /// AWS Access Key ID for Bedrock
    #[arg(long)]
    pub aws_access_key: Option<String>,

    /// AWS Secret Access Key for Bedrock
    #[arg(long)]
    pub aws_secret_key: Option<String>,

    /// AWS Region for Bedrock
    #[arg(long)]
    pub aws_region: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Exit with an error if any entry fell back to untranslated text
    #[arg(long)]
    pub fail_on_fallback: bool,
}

/// Credentials and region for the Bedrock provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsSettings {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    // Catalogs
    pub locales_dir: PathBuf,
    /// Explicit target list; empty means "derive from the directory"
    pub target_languages: Vec<LocaleId>,

    // Provider
    pub provider: ProviderKind,
    pub model: String,
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub aws: AwsSettings,

    // Transport
    pub request_timeout: Duration,
    pub retry: RetryConfig,

    // Exit policy
    pub fail_on_fallback: bool,
}

pub const DEFAULT_LOCALES_DIR: &str = "./i18n";
pub const DEFAULT_AWS_REGION: &str = "us-east-1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

impl Config {
    /// Resolve configuration from flags and the process environment.
    pub fn resolve(args: &CliArgs) -> Result<Self, ConfigError> {
        Self::resolve_with(args, |name| std::env::var(name).ok())
    }

    /// Resolve configuration with precedence flag > environment > default.
    ///
    /// `env` looks up an environment variable; empty values count as unset.
    pub fn resolve_with<F>(args: &CliArgs, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let provider = match args.provider.clone().or_else(|| env("AI_PROVIDER")) {
            Some(raw) => raw.parse::<ProviderKind>()?,
            None => ProviderKind::OpenAi,
        };

        let model = args
            .model
            .clone()
            .or_else(|| env("AI_MODEL"))
            .unwrap_or_else(|| provider.default_model().to_string());

        let target_languages = match args.languages.clone().or_else(|| env("TARGET_LANGUAGES")) {
            Some(list) => parse_locale_list(&list)?,
            None => Vec::new(),
        };

        let request_timeout = match args.timeout_secs {
            Some(secs) => secs,
            None => match env("AI_TIMEOUT_SECS") {
                Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    name: "AI_TIMEOUT_SECS",
                    value: raw,
                })?,
                None => DEFAULT_TIMEOUT_SECS,
            },
        };

        Ok(Self {
            locales_dir: args
                .locales_dir
                .clone()
                .or_else(|| env("LOCALES_DIR").map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCALES_DIR)),
            target_languages,
            provider,
            model,
            api_key: args.api_key.clone().or_else(|| env("AI_API_KEY")),
            api_base_url: args.base_url.clone().or_else(|| env("AI_BASE_URL")),
            aws: AwsSettings {
                access_key_id: args
                    .aws_access_key
                    .clone()
                    .or_else(|| env("AWS_ACCESS_KEY_ID")),
                secret_access_key: args
                    .aws_secret_key
                    .clone()
                    .or_else(|| env("AWS_SECRET_ACCESS_KEY")),
                region: args
                    .aws_region
                    .clone()
                    .or_else(|| env("AWS_REGION"))
                    .unwrap_or_else(|| DEFAULT_AWS_REGION.to_string()),
            },
            request_timeout: Duration::from_secs(request_timeout),
            retry: RetryConfig::translation_call(),
            fail_on_fallback: args.fail_on_fallback,
        })
    }
}
