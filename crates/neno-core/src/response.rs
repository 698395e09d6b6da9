//! Normalized gateway response types.

use serde::{Deserialize, Serialize};

/// Token accounting as reported by the model provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Handler-measured execution metadata attached to every success response.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseMetadata {
    /// Wall-clock duration of the model invocation.
    pub execution_time_ms: f64,
    /// Unix timestamp (seconds) when the response was assembled.
    pub timestamp: u64,
    /// Correlation identifier for this call.
    pub request_id: String,
}

/// Successful outcome of one generation call.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResponse {
    pub success: bool,
    pub content: String,
    pub model_id: String,
    /// Present only when the provider reports token counts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    pub metadata: ResponseMetadata,
}
