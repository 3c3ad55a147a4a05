//! Visitor reviews. Submissions are hidden until an admin approves them.

use anyhow::Result;
use rusqlite::params;
use serde::{Deserialize, Serialize};

use super::Database;
use crate::error::{AppError, Validator};

#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: i64,
    pub name: String,
    pub rating: i64,
    pub comment: String,
    pub facebook_url: Option<String>,
    pub instagram_url: Option<String>,
    pub tiktok_url: Option<String>,
    pub is_approved: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
    pub name: String,
    pub rating: i64,
    pub comment: String,
    #[serde(default)]
    pub facebook_url: Option<String>,
    #[serde(default)]
    pub instagram_url: Option<String>,
    #[serde(default)]
    pub tiktok_url: Option<String>,
}

fn valid_optional_url(value: &Option<String>) -> bool {
    match value.as_deref() {
        None | Some("") => true,
        Some(url) => url.starts_with("http://") || url.starts_with("https://"),
    }
}

impl ReviewInput {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.require("name", self.name.trim().len() >= 2, "Name is required");
        v.require("rating", (1..=5).contains(&self.rating), "Rating must be between 1 and 5");
        v.require(
            "comment",
            self.comment.trim().len() >= 10,
            "Comment must be at least 10 characters",
        );
        v.require("facebook_url", valid_optional_url(&self.facebook_url), "Invalid URL");
        v.require("instagram_url", valid_optional_url(&self.instagram_url), "Invalid URL");
        v.require("tiktok_url", valid_optional_url(&self.tiktok_url), "Invalid URL");
        v.finish()
    }
}

fn review_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Review> {
    Ok(Review {
        id: row.get(0)?,
        name: row.get(1)?,
        rating: row.get(2)?,
        comment: row.get(3)?,
        facebook_url: row.get(4)?,
        instagram_url: row.get(5)?,
        tiktok_url: row.get(6)?,
        is_approved: row.get::<_, i64>(7)? != 0,
        created_at: row.get(8)?,
    })
}

const REVIEW_COLUMNS: &str = "id, name, rating, comment, facebook_url, instagram_url, \
                              tiktok_url, is_approved, created_at";

impl Database {
    /// All reviews, newest first, for the admin moderation queue.
    pub fn list_reviews(&self) -> Result<Vec<Review>> {
        self.query_reviews(false)
    }

    /// Approved reviews only, for the public page.
    pub fn approved_reviews(&self) -> Result<Vec<Review>> {
        self.query_reviews(true)
    }

    fn query_reviews(&self, approved_only: bool) -> Result<Vec<Review>> {
        let conn = self.conn()?;
        let filter = if approved_only { "WHERE is_approved = 1" } else { "" };
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews {filter} ORDER BY created_at DESC, id DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let reviews = stmt
            .query_map([], review_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(reviews)
    }

    /// New submissions always start unapproved.
    pub fn create_review(&self, input: &ReviewInput) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO reviews (name, rating, comment, facebook_url, instagram_url, \
                                  tiktok_url, is_approved) \
             VALUES (?, ?, ?, ?, ?, ?, 0)",
            params![
                input.name,
                input.rating,
                input.comment,
                input.facebook_url,
                input.instagram_url,
                input.tiktok_url,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn approve_review(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute("UPDATE reviews SET is_approved = 1 WHERE id = ?", [id])?;
        Ok(changed > 0)
    }

    pub fn delete_review(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM reviews WHERE id = ?", [id])?;
        Ok(changed > 0)
    }

    pub fn count_reviews(&self) -> Result<i64> {
        let conn = self.conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM reviews", [], |row| row.get(0))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util::open_temp;

    fn sample_input() -> ReviewInput {
        ReviewInput {
            name: "Priya".to_string(),
            rating: 5,
            comment: "Wonderful trip, great guide and itinerary.".to_string(),
            facebook_url: None,
            instagram_url: Some("https://instagram.com/priya".to_string()),
            tiktok_url: Some(String::new()),
        }
    }

    #[test]
    fn unapproved_reviews_stay_off_the_public_listing() {
        let (_dir, db) = open_temp();
        let id = db.create_review(&sample_input()).unwrap();

        assert!(db.approved_reviews().unwrap().is_empty());
        assert_eq!(db.list_reviews().unwrap().len(), 1);

        assert!(db.approve_review(id).unwrap());
        let approved = db.approved_reviews().unwrap();
        assert_eq!(approved.len(), 1);
        assert!(approved[0].is_approved);
    }

    #[test]
    fn rating_and_urls_are_validated() {
        let mut input = sample_input();
        input.rating = 6;
        input.facebook_url = Some("ftp://nope".to_string());
        let err = input.validate().unwrap_err();
        match err {
            AppError::Validation(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.field).collect();
                assert_eq!(names, vec!["rating", "facebook_url"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
