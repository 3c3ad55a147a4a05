//! Serves files from the uploads directory. Stored names are immutable and
//! unique, so responses are cacheable forever.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use super::AppState;

/// Stored upload names are flat; anything with a separator or a `..`
/// component is trying to leave the directory and is rejected outright.
fn is_safe_upload_name(name: &str) -> bool {
    !name.is_empty() && !name.contains("..") && !name.contains('/') && !name.contains('\\')
}

pub async fn serve_upload(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Response {
    if !is_safe_upload_name(&path) {
        return StatusCode::BAD_REQUEST.into_response();
    }

    let full = state.uploads.dir().join(&path);
    let bytes = match tokio::fs::read(&full).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::debug!("upload {} not served: {err}", full.display());
            return StatusCode::NOT_FOUND.into_response();
        }
    };

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    (
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable".to_string()),
        ],
        bytes,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_names_pass() {
        assert!(is_safe_upload_name(
            "2024-05-01T10-00-00-000Z_3b241101-e2bb-4255-8caf-4136c566a962_beach.jpg"
        ));
        assert!(is_safe_upload_name("plain.png"));
    }

    #[test]
    fn traversal_and_separators_are_rejected() {
        assert!(!is_safe_upload_name("../secrets.db"));
        assert!(!is_safe_upload_name(".."));
        assert!(!is_safe_upload_name("nested/path.jpg"));
        assert!(!is_safe_upload_name("nested\\path.jpg"));
        assert!(!is_safe_upload_name("a/../b.jpg"));
        assert!(!is_safe_upload_name(""));
    }
}
