//! Inbound generation request parsing, validation, and defaulting.

use serde::Deserialize;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};

/// Raw body of a generation call, before defaults are applied.
///
/// `prompt` is optional at the serde level so that a missing field surfaces
/// as a validation failure rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub top_p: Option<f32>,
}

/// A request with every parameter validated and resolved against the
/// configured defaults. Constructed once per call, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl GenerationRequest {
    pub fn parse(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|err| GatewayError::Parse(err.to_string()))
    }

    /// Validate fields and fill omitted parameters from the configured
    /// defaults. Explicitly supplied values are used verbatim, including
    /// zeros.
    pub fn resolve(self, config: &GatewayConfig) -> Result<ResolvedRequest> {
        let prompt = self
            .prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                GatewayError::Validation("prompt is required and must not be empty".to_string())
            })?
            .to_string();

        let max_tokens = self.max_tokens.unwrap_or(config.max_tokens);
        if max_tokens == 0 || max_tokens > config.max_tokens_limit {
            return Err(GatewayError::Validation(format!(
                "max_tokens must be between 1 and {}",
                config.max_tokens_limit
            )));
        }

        let temperature = self.temperature.unwrap_or(config.temperature);
        if !(0.0..=1.0).contains(&temperature) {
            return Err(GatewayError::Validation(
                "temperature must be a number between 0.0 and 1.0".to_string(),
            ));
        }

        let top_p = self.top_p.unwrap_or(config.top_p);
        if !(0.0..=1.0).contains(&top_p) {
            return Err(GatewayError::Validation(
                "top_p must be a number between 0.0 and 1.0".to_string(),
            ));
        }

        Ok(ResolvedRequest {
            prompt,
            max_tokens,
            temperature,
            top_p,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GatewayConfig {
        GatewayConfig::default()
    }

    #[test]
    fn omitted_parameters_take_configured_defaults() {
        let request = GenerationRequest::parse(r#"{"prompt": "Hello"}"#).unwrap();
        let resolved = request.resolve(&config()).unwrap();
        assert_eq!(
            resolved,
            ResolvedRequest {
                prompt: "Hello".to_string(),
                max_tokens: 1000,
                temperature: 0.7,
                top_p: 0.9,
            }
        );
    }

    #[test]
    fn explicit_values_are_used_verbatim() {
        let request = GenerationRequest::parse(
            r#"{"prompt": "x", "max_tokens": 12, "temperature": 0.0, "top_p": 0.5}"#,
        )
        .unwrap();
        let resolved = request.resolve(&config()).unwrap();
        assert_eq!(resolved.max_tokens, 12);
        assert_eq!(resolved.temperature, 0.0);
        assert_eq!(resolved.top_p, 0.5);
    }

    #[test]
    fn explicit_defaults_match_omitted_defaults() {
        let omitted = GenerationRequest::parse(r#"{"prompt": "same"}"#)
            .unwrap()
            .resolve(&config())
            .unwrap();
        let explicit = GenerationRequest::parse(
            r#"{"prompt": "same", "max_tokens": 1000, "temperature": 0.7, "top_p": 0.9}"#,
        )
        .unwrap()
        .resolve(&config())
        .unwrap();
        assert_eq!(omitted, explicit);
    }

    #[test]
    fn missing_prompt_is_a_validation_error() {
        let request = GenerationRequest::parse(r#"{"max_tokens": 10}"#).unwrap();
        let err = request.resolve(&config()).unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
        assert!(err.to_string().contains("prompt"));
    }

    #[test]
    fn empty_or_blank_prompt_is_rejected() {
        for body in [r#"{"prompt": ""}"#, r#"{"prompt": "   "}"#] {
            let err = GenerationRequest::parse(body)
                .unwrap()
                .resolve(&config())
                .unwrap_err();
            assert!(matches!(err, GatewayError::Validation(_)), "body: {body}");
        }
    }

    #[test]
    fn out_of_range_parameters_are_rejected() {
        let cases = [
            r#"{"prompt": "x", "temperature": 2.0}"#,
            r#"{"prompt": "x", "temperature": -0.1}"#,
            r#"{"prompt": "x", "top_p": 1.1}"#,
            r#"{"prompt": "x", "max_tokens": 0}"#,
            r#"{"prompt": "x", "max_tokens": 100000}"#,
        ];
        for body in cases {
            let err = GenerationRequest::parse(body)
                .unwrap()
                .resolve(&config())
                .unwrap_err();
            assert!(matches!(err, GatewayError::Validation(_)), "body: {body}");
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        for body in ["{not json", "", r#"{"prompt": "x", "max_tokens": "ten"}"#] {
            let err = GenerationRequest::parse(body).unwrap_err();
            assert!(matches!(err, GatewayError::Parse(_)), "body: {body}");
        }
    }
}
