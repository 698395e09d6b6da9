use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation identity for one call. Callers may supply their own id via
/// `x-request-id`; otherwise a fresh one is minted.
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub correlation_id: String,
}

impl RequestContext {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let correlation_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Self { correlation_id }
    }
}

/// Attach a `RequestContext` to the request and echo the id back on the
/// response so callers can correlate against the log stream.
pub async fn attach_request_context(mut req: Request, next: Next) -> Response {
    let ctx = RequestContext::from_headers(req.headers());
    let correlation_id = ctx.correlation_id.clone();
    req.extensions_mut().insert(ctx);

    let mut response = next.run(req).await;
    if let Ok(value) = correlation_id.parse() {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
