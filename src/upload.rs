//! Upload persistence: writes an incoming image under the public uploads
//! directory and hands back its stable `/uploads/...` URL.

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// URL prefix every locally stored upload lives under.
pub const UPLOADS_URL_PREFIX: &str = "/uploads/";

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ensure the uploads directory exists
    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).context("Failed to create uploads directory")?;
        }
        Ok(())
    }

    /// Persist one uploaded file and return its public URL.
    ///
    /// The stored name is `<sortable timestamp>_<uuid>_<sanitized original>`;
    /// the uuid component makes collisions (and thus overwrites) impossible
    /// even for identical source files uploaded in the same instant.
    pub fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        self.ensure_dir()?;

        let filename = generate_name(original_name);
        let path = self.dir.join(&filename);
        fs::write(&path, bytes)
            .with_context(|| format!("Failed to write upload {}", path.display()))?;

        Ok(format!("{UPLOADS_URL_PREFIX}{filename}"))
    }
}

fn generate_name(original_name: &str) -> String {
    let timestamp = Utc::now()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    let unique = uuid::Uuid::new_v4();
    format!("{timestamp}_{unique}_{}", sanitize_filename(original_name))
}

/// Replace every character outside `[A-Za-z0-9.-]` with `-`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '-' })
        .collect()
}

/// Extract the stored filename from a local upload URL. External URLs and
/// anything outside the uploads prefix yield `None`.
pub fn filename_from_url(url: &str) -> Option<&str> {
    url.strip_prefix(UPLOADS_URL_PREFIX).filter(|rest| !rest.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn saves_and_returns_public_url() {
        let dir = tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("uploads"));

        let url = store.save("beach photo.jpg", b"jpegdata").unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with("_beach-photo.jpg"));

        let filename = filename_from_url(&url).unwrap();
        let stored = std::fs::read(store.dir().join(filename)).unwrap();
        assert_eq!(stored, b"jpegdata");
    }

    #[test]
    fn same_source_never_collides() {
        let dir = tempdir().unwrap();
        let store = UploadStore::new(dir.path().to_path_buf());

        let first = store.save("photo.jpg", b"a").unwrap();
        let second = store.save("photo.jpg", b"b").unwrap();
        assert_ne!(first, second);

        // Both files exist with their own contents.
        let a = std::fs::read(store.dir().join(filename_from_url(&first).unwrap())).unwrap();
        let b = std::fs::read(store.dir().join(filename_from_url(&second).unwrap())).unwrap();
        assert_eq!(a, b"a");
        assert_eq!(b, b"b");
    }

    #[test]
    fn sanitization_keeps_dots_and_dashes() {
        assert_eq!(sanitize_filename("héllo wörld!.JPG"), "h-llo-w-rld-.JPG");
        assert_eq!(sanitize_filename("already-safe.name.png"), "already-safe.name.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), "..-..-etc-passwd");
    }

    #[test]
    fn url_prefix_extraction() {
        assert_eq!(filename_from_url("/uploads/a.jpg"), Some("a.jpg"));
        assert_eq!(filename_from_url("https://cdn.example.com/a.jpg"), None);
        assert_eq!(filename_from_url("/uploads/"), None);
        assert_eq!(filename_from_url("/images/placeholder.jpg"), None);
    }
}
