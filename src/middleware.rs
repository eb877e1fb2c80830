//! Request logging middleware.
//!
//! Generates a UUID v4 for each incoming request and creates a tracing span
//! that wraps the entire request lifecycle. One "Request completed" event is
//! emitted per request with the method, path and status, which makes up the
//! server's access log.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::Instrument;
use uuid::Uuid;

/// Extension type for accessing request ID in handlers if needed.
#[derive(Clone, Debug)]
pub struct RequestId(pub Uuid);

/// Middleware that generates a request ID and logs the request outcome.
///
/// This should be the outermost layer so the span also covers the static
/// file service and its fallback.
pub async fn request_log_layer(mut request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        duration_ms = tracing::field::Empty,
    );

    let start = Instant::now();
    request.extensions_mut().insert(RequestId(request_id));

    async move {
        let response = next.run(request).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        let status = response.status();

        tracing::Span::current().record("duration_ms", duration_ms);
        if status.is_client_error() || status.is_server_error() {
            tracing::warn!(status = status.as_u16(), duration_ms, "Request completed");
        } else {
            tracing::info!(status = status.as_u16(), duration_ms, "Request completed");
        }

        response
    }
    .instrument(span)
    .await
}
