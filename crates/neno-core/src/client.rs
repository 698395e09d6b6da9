//! Transport to the model-inference endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};

/// One `InvokeModel`-style call against an inference endpoint.
///
/// Implementations make exactly one attempt; retry policy belongs to the
/// caller of the gateway, not to this layer.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, model_id: &str, body: Value) -> Result<Value>;
}

/// HTTP client for a Bedrock-style runtime endpoint.
pub struct BedrockHttpClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl BedrockHttpClient {
    pub fn new(config: &GatewayConfig, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("neno/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|err| {
                GatewayError::Config(format!("failed to initialize HTTP client: {err}"))
            })?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn invoke_url(&self, model_id: &str) -> String {
        format!("{}/model/{}/invoke", self.endpoint, model_id)
    }
}

#[async_trait]
impl ModelInvoker for BedrockHttpClient {
    async fn invoke(&self, model_id: &str, body: Value) -> Result<Value> {
        let mut request = self.http.post(self.invoke_url(model_id)).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GatewayError::Invocation(format!(
                "endpoint returned {status}: {}",
                truncate(&detail, 256)
            )));
        }

        response.json::<Value>().await.map_err(|err| {
            GatewayError::ResponseShape(format!("endpoint returned non-JSON body: {err}"))
        })
    }
}

fn map_transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Invocation(err.to_string())
    }
}

/// Truncate on a char boundary for log and error output.
pub(crate) fn truncate(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
