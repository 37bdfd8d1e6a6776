use std::env;
use std::time::Duration;

use airdesk_flights::FlightApiConfig;
use airdesk_retrieval::ScraperConfig;
use thiserror::Error;

pub const DEFAULT_BIND: &str = "0.0.0.0:3001";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("completion credentials are missing: set AIRDESK_OPENAI_API_KEY or OPENAI_API_KEY")]
    MissingCompletionKey,
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct OpenAiRuntimeConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout: Duration,
}

impl OpenAiRuntimeConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.3,
            max_tokens: 1000,
            request_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AirdeskConfig {
    pub bind: String,
    pub openai: OpenAiRuntimeConfig,
    pub flights: Option<FlightApiConfig>,
    pub scraper: ScraperConfig,
    pub preload_retry_interval: Duration,
}

impl AirdeskConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let openai = build_openai_runtime_config().ok_or(ConfigError::MissingCompletionKey)?;
        let preload_retry_interval = match env_value("AIRDESK_PRELOAD_RETRY_SECONDS") {
            Some(value) => Duration::from_secs(parse_seconds("AIRDESK_PRELOAD_RETRY_SECONDS", &value)?),
            None => Duration::from_secs(60),
        };

        Ok(Self {
            bind: env_value("AIRDESK_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            openai,
            flights: FlightApiConfig::from_env(),
            scraper: build_scraper_config(),
            preload_retry_interval,
        })
    }
}

pub fn build_openai_runtime_config() -> Option<OpenAiRuntimeConfig> {
    let api_key = env_value("AIRDESK_OPENAI_API_KEY").or_else(|| env_value("OPENAI_API_KEY"))?;
    let base_url = env_value("AIRDESK_OPENAI_BASE_URL")
        .unwrap_or_else(|| "https://api.openai.com".to_string());

    let mut config = OpenAiRuntimeConfig::new(api_key, base_url);
    if let Some(model) = env_value("AIRDESK_OPENAI_MODEL") {
        config.model = model;
    }
    Some(config)
}

pub fn build_scraper_config() -> ScraperConfig {
    match env_value("AIRDESK_KNOWLEDGE_BASE_URL") {
        Some(base_url) => ScraperConfig::with_base_url(&base_url),
        None => ScraperConfig::default(),
    }
}

fn env_value(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_seconds(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse::<u64>()
        .ok()
        .filter(|seconds| *seconds > 0)
        .ok_or_else(|| ConfigError::Invalid {
            name,
            value: value.to_string(),
        })
}
