//! Router assembly.
//!
//! Every request falls through to the static file service; there is no other
//! routing. Layers add the access log and a `no-cache` header so the browser
//! revalidates files while they are being edited.

use std::path::Path;
use std::sync::Arc;

use axum::http::header::{HeaderValue, CACHE_CONTROL};
use axum::{middleware, Router};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::CACHE_CONTROL_DEV;
use crate::http::static_files::{create_static_service, file_trailing_slash_layer};
use crate::middleware::request_log_layer;

/// Create the router serving `root`.
pub fn create_router(root: &Path) -> Router {
    Router::new()
        .fallback_service(create_static_service(root))
        .layer(middleware::from_fn_with_state(
            Arc::<Path>::from(root),
            file_trailing_slash_layer,
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_DEV),
        ))
        .layer(middleware::from_fn(request_log_layer))
}
