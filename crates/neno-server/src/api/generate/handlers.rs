use std::time::Duration;

use axum::extract::{Extension, State};
use axum::Json;
use tracing::warn;

use crate::api::request_context::RequestContext;
use crate::error::ApiError;
use crate::state::AppState;
use neno_core::{GatewayError, GenerationResponse};

/// POST /v1/generate
///
/// The body is taken raw so that malformed JSON is answered with the same
/// failure shape as every other error.
pub async fn generate(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    body: String,
) -> Result<Json<GenerationResponse>, ApiError> {
    let _permit = state.acquire_permit().await;
    let timeout = Duration::from_secs(state.request_timeout_secs);

    let result = tokio::time::timeout(
        timeout,
        state.gateway.handle_raw(&body, &ctx.correlation_id),
    )
    .await;

    match result {
        Ok(Ok(response)) => Ok(Json(response)),
        Ok(Err(err)) => Err(ApiError::from_gateway(err, &ctx.correlation_id)),
        Err(_) => {
            warn!(
                correlation_id = %ctx.correlation_id,
                timeout_secs = state.request_timeout_secs,
                "generation abandoned at the request ceiling"
            );
            Err(ApiError::from_gateway(
                GatewayError::Timeout,
                &ctx.correlation_id,
            ))
        }
    }
}
