//! Media reconciliation: cross-references files on disk in the uploads
//! directory against every image URL the content store knows about, to
//! classify each file as active (referenced) or unused (orphaned and safe
//! to delete).

pub mod cleanup;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::Database;
use crate::upload::{filename_from_url, UPLOADS_URL_PREFIX};

#[derive(Debug, Clone, Serialize)]
pub struct MediaFile {
    pub name: String,
    pub url: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct MediaLibrary {
    uploads_dir: PathBuf,
}

impl MediaLibrary {
    pub fn new(uploads_dir: PathBuf) -> Self {
        Self { uploads_dir }
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    /// List every file in the uploads directory with its activity flag,
    /// newest first.
    ///
    /// This never fails: a missing or unreadable uploads directory is an
    /// empty library, and a database error degrades to marking every file
    /// unused. Both only affect a deletion-safety hint, not data integrity.
    pub fn list(&self, db: &Database) -> Vec<MediaFile> {
        let entries = match fs::read_dir(&self.uploads_dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::debug!("uploads directory unavailable: {err}");
                return Vec::new();
            }
        };

        let used = match used_filenames(db) {
            Ok(used) => used,
            Err(err) => {
                tracing::error!("media usage scan failed, treating all files as unused: {err:#}");
                HashSet::new()
            }
        };

        let mut files = Vec::new();
        for entry in entries.flatten() {
            // A file deleted between readdir and stat is simply skipped.
            let Ok(metadata) = entry.metadata() else { continue };
            if !metadata.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let created_at = metadata
                .created()
                .or_else(|_| metadata.modified())
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            files.push(MediaFile {
                url: format!("{UPLOADS_URL_PREFIX}{name}"),
                is_active: used.contains(&name),
                size: metadata.len(),
                created_at,
                name,
            });
        }

        files.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.name.cmp(&a.name)));
        files
    }

    /// True when the library holds a file for this local upload URL.
    /// External URLs are reported as present; only `/uploads/` paths can go
    /// stale locally.
    pub fn url_resolves(&self, url: &str) -> bool {
        match filename_from_url(url) {
            Some(name) => self.uploads_dir.join(name).is_file(),
            None => true,
        }
    }

    /// Remove one file from the uploads directory.
    pub fn delete(&self, filename: &str) -> Result<()> {
        let path = self.uploads_dir.join(filename);
        fs::remove_file(&path)
            .with_context(|| format!("Failed to delete media file {}", path.display()))?;
        Ok(())
    }
}

/// Every filename under `/uploads/` referenced by any content record: the
/// site profile's image fields, tour image lists, destination covers and
/// image lists, and the home page's hero, destination and testimonial
/// images. External URLs are ignored; they cannot be deleted locally.
fn used_filenames(db: &Database) -> Result<HashSet<String>> {
    let mut used = HashSet::new();
    let mut add = |url: &str| {
        if let Some(name) = filename_from_url(url) {
            used.insert(name.to_string());
        }
    };

    if let Some(profile) = db.get_site_profile()? {
        for (_, value) in profile.image_fields() {
            if let Some(url) = value {
                add(url);
            }
        }
    }

    for tour in db.list_tours()? {
        for url in &tour.images {
            add(url);
        }
    }

    for destination in db.list_destinations()? {
        if let Some(url) = &destination.image_url {
            add(url);
        }
        for url in &destination.images {
            add(url);
        }
    }

    if let Some(home) = db.get_home_page()? {
        if let Some(url) = &home.hero_image {
            add(url);
        }
        for destination in &home.popular_destinations {
            add(&destination.image);
        }
        for testimonial in &home.testimonials {
            if let Some(url) = &testimonial.avatar {
                add(url);
            }
        }
    }

    Ok(used)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::destinations::DestinationInput;
    use crate::db::home::{HomePage, Testimonial};
    use crate::db::profile::SiteProfile;
    use crate::db::test_util::open_temp;
    use crate::db::tours::TourInput;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"img").unwrap();
    }

    fn tour_with_images(images: &[&str]) -> TourInput {
        TourInput {
            title: "A tour with images".to_string(),
            description: "A long enough description for validation.".to_string(),
            price: 100.0,
            duration: "3 days".to_string(),
            location: "Kandy".to_string(),
            images: images.iter().map(|s| s.to_string()).collect(),
            locations: Vec::new(),
            is_featured: false,
        }
    }

    #[test]
    fn classifies_active_and_unused() {
        let (_db_dir, db) = open_temp();
        let uploads = tempdir().unwrap();
        touch(uploads.path(), "tour.jpg");
        touch(uploads.path(), "hero.jpg");
        touch(uploads.path(), "avatar.jpg");
        touch(uploads.path(), "orphan.jpg");

        db.create_tour(&tour_with_images(&["/uploads/tour.jpg"])).unwrap();
        db.upsert_site_profile(&SiteProfile {
            tours_hero_image: Some("/uploads/hero.jpg".to_string()),
            ..Default::default()
        })
        .unwrap();
        db.upsert_home_page(&HomePage {
            testimonials: vec![Testimonial {
                name: "Mark".to_string(),
                avatar: Some("/uploads/avatar.jpg".to_string()),
                comment: "Great".to_string(),
                rating: 5,
            }],
            ..Default::default()
        })
        .unwrap();

        let library = MediaLibrary::new(uploads.path().to_path_buf());
        let files = library.list(&db);
        assert_eq!(files.len(), 4);

        let active: Vec<_> =
            files.iter().filter(|f| f.is_active).map(|f| f.name.as_str()).collect();
        assert_eq!(active.len(), 3);
        assert!(active.contains(&"tour.jpg"));
        assert!(active.contains(&"hero.jpg"));
        assert!(active.contains(&"avatar.jpg"));

        let orphan = files.iter().find(|f| f.name == "orphan.jpg").unwrap();
        assert!(!orphan.is_active);
        assert_eq!(orphan.url, "/uploads/orphan.jpg");
    }

    #[test]
    fn external_urls_are_ignored() {
        let (_db_dir, db) = open_temp();
        let uploads = tempdir().unwrap();
        touch(uploads.path(), "local.jpg");

        db.create_tour(&tour_with_images(&[
            "https://cdn.example.com/remote.jpg",
            "/uploads/local.jpg",
        ]))
        .unwrap();

        let library = MediaLibrary::new(uploads.path().to_path_buf());
        let files = library.list(&db);
        assert_eq!(files.len(), 1);
        assert!(files[0].is_active);
    }

    #[test]
    fn db_reference_to_missing_file_produces_no_entry() {
        let (_db_dir, db) = open_temp();
        let uploads = tempdir().unwrap();

        db.create_tour(&tour_with_images(&["/uploads/long-gone.jpg"])).unwrap();

        let library = MediaLibrary::new(uploads.path().to_path_buf());
        assert!(library.list(&db).is_empty());
    }

    #[test]
    fn missing_uploads_dir_is_an_empty_library() {
        let (_db_dir, db) = open_temp();
        let library = MediaLibrary::new(PathBuf::from("/nonexistent/uploads"));
        assert!(library.list(&db).is_empty());
    }

    #[test]
    fn destination_cover_and_gallery_both_count() {
        let (_db_dir, db) = open_temp();
        let uploads = tempdir().unwrap();
        touch(uploads.path(), "cover.jpg");
        touch(uploads.path(), "second.jpg");

        db.create_destination(&DestinationInput {
            title: "Mirissa".to_string(),
            description: None,
            image_url: None,
            images: vec!["/uploads/cover.jpg".to_string(), "/uploads/second.jpg".to_string()],
            latitude: None,
            longitude: None,
            locations: Vec::new(),
        })
        .unwrap();

        let library = MediaLibrary::new(uploads.path().to_path_buf());
        assert!(library.list(&db).iter().all(|f| f.is_active));
    }

    #[test]
    fn url_resolution_for_fallbacks() {
        let uploads = tempdir().unwrap();
        touch(uploads.path(), "present.jpg");
        let library = MediaLibrary::new(uploads.path().to_path_buf());

        assert!(library.url_resolves("/uploads/present.jpg"));
        assert!(!library.url_resolves("/uploads/absent.jpg"));
        assert!(library.url_resolves("https://cdn.example.com/x.jpg"));
    }
}
