// Static assets under the configured directory
use super::AppState;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Relative path under the static root, or None for anything that could
/// climb out of it.
fn relative_path(uri_path: &str) -> Option<PathBuf> {
    let trimmed = uri_path.trim_start_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    let path = Path::new(trimmed);
    if path
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        Some(path.to_path_buf())
    } else {
        None
    }
}

pub async fn serve_static(State(state): State<AppState>, uri: Uri) -> Response {
    let not_found = (StatusCode::NOT_FOUND, "Not Found").into_response();
    let Some(relative) = relative_path(uri.path()) else {
        return not_found;
    };

    let root = Path::new(&state.config.static_dir);
    let (Ok(canonical), Ok(root)) = (root.join(&relative).canonicalize(), root.canonicalize())
    else {
        debug!("Static miss: {}", uri.path());
        return not_found;
    };
    if !canonical.starts_with(&root) || !canonical.is_file() {
        return not_found;
    }

    match tokio::fs::read(&canonical).await {
        Ok(contents) => {
            let mime = mime_guess::from_path(&relative).first_or_octet_stream();
            (
                [
                    (header::CONTENT_TYPE, mime.as_ref().to_string()),
                    (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
                ],
                contents,
            )
                .into_response()
        }
        Err(e) => {
            debug!("Static read failed for {}: {}", canonical.display(), e);
            not_found
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_traversal() {
        assert_eq!(relative_path("/css/styles.css"), Some(PathBuf::from("css/styles.css")));
        assert_eq!(relative_path("/"), None);
        assert_eq!(relative_path("/../Cargo.toml"), None);
        assert_eq!(relative_path("/css/../../secret"), None);
    }
}
