//! One inbound call, one model invocation, one normalized response.

use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use tracing::{debug, error, info};

use crate::client::{truncate, ModelInvoker};
use crate::config::GatewayConfig;
use crate::error::Result;
use crate::providers;
use crate::request::GenerationRequest;
use crate::response::{GenerationResponse, ResponseMetadata};

/// The request handler. Stateless across invocations: the configuration is
/// immutable and the invoker holds no per-request state.
pub struct Gateway {
    config: GatewayConfig,
    invoker: Arc<dyn ModelInvoker>,
}

impl Gateway {
    pub fn new(config: GatewayConfig, invoker: Arc<dyn ModelInvoker>) -> Self {
        Self { config, invoker }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Handle one raw request body.
    pub async fn handle_raw(&self, body: &str, request_id: &str) -> Result<GenerationResponse> {
        let request = GenerationRequest::parse(body)?;
        self.handle(request, request_id).await
    }

    /// Handle one parsed request. Exactly one invocation attempt is made;
    /// every failure is reported synchronously as a `GatewayError`.
    pub async fn handle(
        &self,
        request: GenerationRequest,
        request_id: &str,
    ) -> Result<GenerationResponse> {
        let resolved = request.resolve(&self.config)?;
        let adapter = providers::adapter_for(&self.config.model_id);
        let payload = (adapter.build_request)(&resolved);

        debug!(
            request_id,
            model_id = %self.config.model_id,
            max_tokens = resolved.max_tokens,
            "invoking model"
        );

        let started = Instant::now();
        let raw = match self.invoker.invoke(&self.config.model_id, payload).await {
            Ok(raw) => raw,
            Err(err) => {
                error!(
                    request_id,
                    model_id = %self.config.model_id,
                    error = %err,
                    "model invocation failed"
                );
                return Err(err);
            }
        };
        let execution_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        let output = match (adapter.parse_response)(&raw) {
            Ok(output) => output,
            Err(err) => {
                let raw_text = raw.to_string();
                error!(
                    request_id,
                    model_id = %self.config.model_id,
                    payload = truncate(&raw_text, 512),
                    "unreadable provider response"
                );
                return Err(err);
            }
        };

        info!(
            request_id,
            model_id = %self.config.model_id,
            execution_time_ms,
            "generation complete"
        );

        Ok(GenerationResponse {
            success: true,
            content: output.content,
            model_id: self.config.model_id.clone(),
            usage: output.usage,
            metadata: ResponseMetadata {
                execution_time_ms,
                timestamp: unix_timestamp(),
                request_id: request_id.to_string(),
            },
        })
    }
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Records every invocation and replays a canned result.
    struct RecordingInvoker {
        calls: Mutex<Vec<(String, Value)>>,
        result: Box<dyn Fn() -> Result<Value> + Send + Sync>,
    }

    impl RecordingInvoker {
        fn returning(result: impl Fn() -> Result<Value> + Send + Sync + 'static) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                result: Box::new(result),
            })
        }

        fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelInvoker for RecordingInvoker {
        async fn invoke(&self, model_id: &str, body: Value) -> Result<Value> {
            self.calls
                .lock()
                .unwrap()
                .push((model_id.to_string(), body));
            (self.result)()
        }
    }

    fn anthropic_reply() -> Value {
        json!({
            "content": [{ "type": "text", "text": "Hi!" }],
            "usage": { "input_tokens": 8, "output_tokens": 3 },
        })
    }

    fn gateway_with(invoker: Arc<RecordingInvoker>) -> Gateway {
        Gateway::new(GatewayConfig::default(), invoker)
    }

    #[tokio::test]
    async fn defaults_are_visible_to_the_invoker() {
        let invoker = RecordingInvoker::returning(|| Ok(anthropic_reply()));
        let gateway = gateway_with(invoker.clone());

        let response = gateway
            .handle_raw(r#"{"prompt": "Hello"}"#, "req-1")
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.content, "Hi!");
        assert_eq!(response.model_id, GatewayConfig::default().model_id);
        assert_eq!(response.metadata.request_id, "req-1");
        let usage = response.usage.unwrap();
        assert_eq!(usage.input_tokens, 8);
        assert_eq!(usage.output_tokens, 3);

        let calls = invoker.calls();
        assert_eq!(calls.len(), 1);
        let (model_id, payload) = &calls[0];
        assert_eq!(model_id, &GatewayConfig::default().model_id);
        assert_eq!(payload["messages"][0]["content"], "Hello");
        assert_eq!(payload["max_tokens"], 1000);
        assert!((payload["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!((payload["top_p"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[tokio::test]
    async fn empty_prompt_fails_before_any_invocation() {
        let invoker = RecordingInvoker::returning(|| Ok(anthropic_reply()));
        let gateway = gateway_with(invoker.clone());

        let err = gateway
            .handle_raw(r#"{"prompt": ""}"#, "req-2")
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Validation(_)));
        assert!(invoker.calls().is_empty());
    }

    #[tokio::test]
    async fn out_of_range_temperature_fails_before_any_invocation() {
        let invoker = RecordingInvoker::returning(|| Ok(anthropic_reply()));
        let gateway = gateway_with(invoker.clone());

        let err = gateway
            .handle_raw(r#"{"prompt": "x", "temperature": 2.0}"#, "req-3")
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Validation(_)));
        assert!(invoker.calls().is_empty());
    }

    #[tokio::test]
    async fn invoker_timeout_is_reported_as_timeout() {
        let invoker = RecordingInvoker::returning(|| Err(GatewayError::Timeout));
        let gateway = gateway_with(invoker);

        let err = gateway
            .handle_raw(r#"{"prompt": "x"}"#, "req-4")
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Timeout));
    }

    #[tokio::test]
    async fn unreadable_provider_payload_is_a_shape_error() {
        let invoker = RecordingInvoker::returning(|| Ok(json!({ "unexpected": true })));
        let gateway = gateway_with(invoker);

        let err = gateway
            .handle_raw(r#"{"prompt": "x"}"#, "req-5")
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::ResponseShape(_)));
    }

    #[tokio::test]
    async fn identical_requests_are_independent() {
        let invoker = RecordingInvoker::returning(|| Ok(anthropic_reply()));
        let gateway = gateway_with(invoker.clone());

        let first = gateway
            .handle_raw(r#"{"prompt": "same"}"#, "req-a")
            .await
            .unwrap();
        let second = gateway
            .handle_raw(r#"{"prompt": "same"}"#, "req-b")
            .await
            .unwrap();

        assert_eq!(first.content, second.content);
        assert_eq!(first.metadata.request_id, "req-a");
        assert_eq!(second.metadata.request_id, "req-b");

        // Two calls, same payload: no state leaks between invocations.
        let calls = invoker.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, calls[1].1);
    }
}
