//! Deployment-time gateway configuration.
//!
//! Read once from the environment at cold start and immutable afterwards.
//! Handlers receive it by reference and never consult the environment
//! themselves, so behavior is fixed for the lifetime of the process.

use crate::error::{GatewayError, Result};

const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-sonnet-20240229-v1:0";
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_MAX_TOKENS: u32 = 1000;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TOP_P: f32 = 0.9;
const DEFAULT_MAX_TOKENS_LIMIT: u32 = 4096;

/// Immutable configuration for the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Model identifier passed to the inference endpoint.
    pub model_id: String,
    /// Base URL of the model runtime endpoint.
    pub endpoint: String,
    /// Optional bearer token for the endpoint.
    pub api_key: Option<String>,
    /// Default token budget for requests that omit `max_tokens`.
    pub max_tokens: u32,
    /// Default sampling temperature for requests that omit `temperature`.
    pub temperature: f32,
    /// Default nucleus-sampling cutoff for requests that omit `top_p`.
    pub top_p: f32,
    /// Hard ceiling on `max_tokens`, requested or defaulted.
    pub max_tokens_limit: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            endpoint: endpoint_for_region(DEFAULT_REGION),
            api_key: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            max_tokens_limit: DEFAULT_MAX_TOKENS_LIMIT,
        }
    }
}

impl GatewayConfig {
    /// Load configuration from the process environment.
    ///
    /// Unparsable or out-of-range values are hard errors: a misconfigured
    /// deployment must fail at cold start, not answer requests with
    /// best-effort values.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let model_id = non_empty(lookup("BEDROCK_MODEL_ID"))
            .unwrap_or_else(|| DEFAULT_MODEL_ID.to_string());

        let endpoint = match non_empty(lookup("BEDROCK_ENDPOINT")) {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => {
                let region = non_empty(lookup("AWS_REGION"))
                    .unwrap_or_else(|| DEFAULT_REGION.to_string());
                endpoint_for_region(&region)
            }
        };

        let config = Self {
            model_id,
            endpoint,
            api_key: non_empty(lookup("BEDROCK_API_KEY")),
            max_tokens: parse_var(&lookup, "MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            temperature: parse_var(&lookup, "TEMPERATURE", DEFAULT_TEMPERATURE)?,
            top_p: parse_var(&lookup, "TOP_P", DEFAULT_TOP_P)?,
            max_tokens_limit: parse_var(&lookup, "MAX_TOKENS_LIMIT", DEFAULT_MAX_TOKENS_LIMIT)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_tokens_limit == 0 {
            return Err(GatewayError::Config(
                "MAX_TOKENS_LIMIT must be a positive integer".to_string(),
            ));
        }
        if self.max_tokens == 0 || self.max_tokens > self.max_tokens_limit {
            return Err(GatewayError::Config(format!(
                "MAX_TOKENS must be between 1 and {}",
                self.max_tokens_limit
            )));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(GatewayError::Config(
                "TEMPERATURE must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(GatewayError::Config(
                "TOP_P must be between 0.0 and 1.0".to_string(),
            ));
        }
        Ok(())
    }
}

fn endpoint_for_region(region: &str) -> String {
    format!("https://bedrock-runtime.{region}.amazonaws.com")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T> {
    match non_empty(lookup(key)) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| GatewayError::Config(format!("invalid {key}='{raw}'"))),
        None => Ok(default),
    }
}
