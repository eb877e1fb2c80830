use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::io;

/// Per-request error. Rendered to the client only; never stops the server.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl RequestError {
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::NotFound(_) => StatusCode::NOT_FOUND,
            RequestError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RequestError::Io(e) if e.kind() == io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
            RequestError::Io(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                StatusCode::FORBIDDEN
            }
            RequestError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            RequestError::Io(e) if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!(error = %e, "Failed to read directory");
                "Internal server error".to_string()
            }
            RequestError::Io(_) => status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
            _ => self.to_string(),
        };

        let body = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Error {}</title>
</head>
<body>
    <h1>Error {}</h1>
    <p>{}</p>
</body>
</html>"#,
            status.as_u16(),
            status.as_u16(),
            tera::escape_html(&message)
        );

        (status, Html(body)).into_response()
    }
}
