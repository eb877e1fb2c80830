//! Static file serving with directory listings.
//!
//! Files are served by `ServeDir`, which handles content types, ranges,
//! conditional requests, `index.html` lookup and the trailing-slash redirect
//! for directories. When `ServeDir` finds nothing, the listing fallback renders
//! an HTML index for directories and a 404 page for everything else.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::Uri;
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, MethodRouter};
use tower_http::services::ServeDir;

use crate::error::RequestError;

/// Create the static file service for `root`.
///
/// Returns a `ServeDir` service that:
/// 1. Serves files (and `index.html` for directories) from `root`
/// 2. Falls back to a generated listing for directories without an index
pub fn create_static_service(root: &Path) -> ServeDir<MethodRouter> {
    let listing_root: Arc<Path> = Arc::from(root);

    let listing: MethodRouter = get(move |uri: Uri| {
        let root = Arc::clone(&listing_root);
        async move { directory_listing(&root, &uri).await }
    });

    ServeDir::new(root)
        .append_index_html_on_directories(true)
        .fallback(listing)
}

/// Middleware that answers 404 when a regular file is requested with a
/// trailing slash; `ServeDir` would otherwise serve the file.
pub async fn file_trailing_slash_layer(
    State(root): State<Arc<Path>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        if let Ok(decoded) = urlencoding::decode(&path) {
            if let Some(target) = resolve_path(&root, &decoded) {
                let is_file = tokio::fs::metadata(&target)
                    .await
                    .map(|m| m.is_file())
                    .unwrap_or(false);
                if is_file {
                    return RequestError::NotFound(decoded.into_owned()).into_response();
                }
            }
        }
    }

    next.run(request).await
}

async fn directory_listing(root: &Path, uri: &Uri) -> Response {
    match render_directory(root, uri.path()).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Render the listing for `request_path`, or the error the client should see.
pub async fn render_directory(root: &Path, request_path: &str) -> Result<String, RequestError> {
    let decoded = urlencoding::decode(request_path)
        .map_err(|_| RequestError::BadRequest(format!("path is not valid UTF-8: {request_path}")))?;

    let dir = resolve_path(root, &decoded)
        .ok_or_else(|| RequestError::NotFound(decoded.to_string()))?;

    let metadata = tokio::fs::metadata(&dir)
        .await
        .map_err(|_| RequestError::NotFound(decoded.to_string()))?;
    if !metadata.is_dir() {
        return Err(RequestError::NotFound(decoded.to_string()));
    }

    let mut entries = Vec::new();
    let mut read_dir = tokio::fs::read_dir(&dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
        entries.push(ListingEntry { name, is_dir });
    }
    entries.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    Ok(render_listing(&decoded, &entries))
}

/// Map a decoded request path onto the filesystem below `root`.
///
/// Returns `None` for paths that would escape `root`.
pub fn resolve_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let mut resolved = root.to_path_buf();
    for component in Path::new(request_path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(resolved)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
}

pub fn render_listing(display_path: &str, entries: &[ListingEntry]) -> String {
    let title = format!("Directory listing for {}", tera::escape_html(display_path));

    let mut items = String::new();
    for entry in entries {
        let suffix = if entry.is_dir { "/" } else { "" };
        items.push_str(&format!(
            "<li><a href=\"{}{suffix}\">{}{suffix}</a></li>\n",
            urlencoding::encode(&entry.name),
            tera::escape_html(&entry.name),
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body>
<h1>{title}</h1>
<hr>
<ul>
{items}</ul>
<hr>
</body>
</html>
"#
    )
}
