//! Best-effort removal of uploaded files that an entity no longer
//! references. This is a local, per-entity diff: it does not consult the
//! global reconciliation in [`super`], so a file shared verbatim between
//! two entities can be removed by either of them. The media admin page
//! exists to audit exactly that drift.

use std::fs;
use std::path::Path;

use crate::upload::filename_from_url;

/// Unlink files referenced by `old` but absent from `new`. Only local
/// `/uploads/` URLs are eligible; external URLs are never touched.
pub fn remove_stale_uploads(uploads_dir: &Path, old: &[String], new: &[String]) {
    for url in old {
        if !new.contains(url) {
            unlink_upload(uploads_dir, url);
        }
    }
}

/// Unlink every local upload in the list, for entity deletion.
pub fn remove_uploads<'a>(uploads_dir: &Path, urls: impl IntoIterator<Item = &'a String>) {
    for url in urls {
        unlink_upload(uploads_dir, url);
    }
}

/// A failed unlink is logged and swallowed; cleanup must never block the
/// database mutation it follows.
fn unlink_upload(uploads_dir: &Path, url: &str) {
    let Some(filename) = filename_from_url(url) else { return };
    // Stored URLs are always flat; a nested or `..` component means a
    // tampered row and must not reach outside the uploads directory.
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        tracing::warn!("refusing to remove suspicious upload path {url}");
        return;
    }
    let path = uploads_dir.join(filename);
    match fs::remove_file(&path) {
        Ok(()) => tracing::debug!("removed unreferenced upload {}", path.display()),
        Err(err) => tracing::warn!("failed to remove upload {}: {err}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"img").unwrap();
    }

    #[test]
    fn update_diff_removes_only_dropped_images() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "kept.jpg");
        touch(dir.path(), "dropped.jpg");

        let old = vec!["/uploads/kept.jpg".to_string(), "/uploads/dropped.jpg".to_string()];
        let new = vec!["/uploads/kept.jpg".to_string()];
        remove_stale_uploads(dir.path(), &old, &new);

        assert!(dir.path().join("kept.jpg").exists());
        assert!(!dir.path().join("dropped.jpg").exists());
    }

    #[test]
    fn external_urls_are_never_touched() {
        let dir = tempdir().unwrap();
        let old = vec!["https://cdn.example.com/remote.jpg".to_string()];
        remove_stale_uploads(dir.path(), &old, &[]);
        // Nothing to assert on disk; the point is that no panic or unlink
        // attempt escapes the uploads directory.
    }

    #[test]
    fn traversal_in_a_stored_url_never_escapes_the_directory() {
        let root = tempdir().unwrap();
        let uploads = root.path().join("uploads");
        fs::create_dir(&uploads).unwrap();
        fs::write(root.path().join("outside.jpg"), b"img").unwrap();

        let urls = vec![
            "/uploads/../outside.jpg".to_string(),
            "/uploads/sub/dir.jpg".to_string(),
        ];
        remove_uploads(&uploads, &urls);
        assert!(root.path().join("outside.jpg").exists());
    }

    #[test]
    fn delete_removes_all_local_images_best_effort() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a.jpg");

        let urls = vec![
            "/uploads/a.jpg".to_string(),
            "/uploads/already-missing.jpg".to_string(),
            "https://cdn.example.com/b.jpg".to_string(),
        ];
        // The missing file and the external URL must not abort the sweep.
        remove_uploads(dir.path(), &urls);
        assert!(!dir.path().join("a.jpg").exists());
    }
}
