//! Contact-form submissions and their admin inbox.

use anyhow::Result;
use rusqlite::params;
use serde::{Deserialize, Serialize};

use super::Database;
use crate::error::{looks_like_email, AppError, Validator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    New,
    Read,
    Archived,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::New => "new",
            ContactStatus::Read => "read",
            ContactStatus::Archived => "archived",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "new" => Some(ContactStatus::New),
            "read" => Some(ContactStatus::Read),
            "archived" => Some(ContactStatus::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactSubmission {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub status: ContactStatus,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
}

impl ContactInput {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.require("name", self.name.trim().len() >= 2, "Name is required");
        v.require("email", looks_like_email(&self.email), "Invalid email");
        v.require(
            "message",
            self.message.trim().len() >= 10,
            "Message must be at least 10 characters",
        );
        v.finish()
    }
}

/// One page of the admin inbox.
#[derive(Debug, Serialize)]
pub struct ContactPage {
    pub submissions: Vec<ContactSubmission>,
    pub total: i64,
    pub pages: i64,
    pub current_page: i64,
}

fn submission_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ContactSubmission> {
    let status: String = row.get(5)?;
    Ok(ContactSubmission {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        message: row.get(4)?,
        status: ContactStatus::from_str(&status).unwrap_or(ContactStatus::New),
        created_at: row.get(6)?,
    })
}

impl Database {
    pub fn create_contact_submission(&self, input: &ContactInput) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO contact_submissions (name, email, phone, message) VALUES (?, ?, ?, ?)",
            params![input.name, input.email, input.phone, input.message],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list_contact_submissions(&self, page: i64, limit: i64) -> Result<ContactPage> {
        let page = page.max(1);
        let limit = limit.clamp(1, 100);
        let conn = self.conn()?;

        let total: i64 =
            conn.query_row("SELECT COUNT(*) FROM contact_submissions", [], |row| row.get(0))?;

        let mut stmt = conn.prepare(
            "SELECT id, name, email, phone, message, status, created_at \
             FROM contact_submissions ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )?;
        let submissions = stmt
            .query_map(params![limit, (page - 1) * limit], submission_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(ContactPage {
            submissions,
            total,
            pages: (total + limit - 1) / limit,
            current_page: page,
        })
    }

    pub fn get_contact_submission(&self, id: i64) -> Result<Option<ContactSubmission>> {
        let conn = self.conn()?;
        let result = conn.query_row(
            "SELECT id, name, email, phone, message, status, created_at \
             FROM contact_submissions WHERE id = ?",
            [id],
            submission_from_row,
        );
        match result {
            Ok(submission) => Ok(Some(submission)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn update_contact_status(&self, id: i64, status: ContactStatus) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE contact_submissions SET status = ? WHERE id = ?",
            params![status.as_str(), id],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_contact_submission(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM contact_submissions WHERE id = ?", [id])?;
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util::open_temp;

    fn sample_input(n: usize) -> ContactInput {
        ContactInput {
            name: format!("Visitor {n}"),
            email: "visitor@example.com".to_string(),
            phone: None,
            message: "I would like to book the hill country tour.".to_string(),
        }
    }

    #[test]
    fn pagination_counts_pages() {
        let (_dir, db) = open_temp();
        for i in 0..25 {
            db.create_contact_submission(&sample_input(i)).unwrap();
        }

        let page = db.list_contact_submissions(1, 20).unwrap();
        assert_eq!(page.submissions.len(), 20);
        assert_eq!(page.total, 25);
        assert_eq!(page.pages, 2);

        let page = db.list_contact_submissions(2, 20).unwrap();
        assert_eq!(page.submissions.len(), 5);
        assert_eq!(page.current_page, 2);
    }

    #[test]
    fn status_transitions() {
        let (_dir, db) = open_temp();
        let id = db.create_contact_submission(&sample_input(0)).unwrap();

        let submission = db.get_contact_submission(id).unwrap().unwrap();
        assert_eq!(submission.status, ContactStatus::New);

        db.update_contact_status(id, ContactStatus::Archived).unwrap();
        let submission = db.get_contact_submission(id).unwrap().unwrap();
        assert_eq!(submission.status, ContactStatus::Archived);

        assert!(db.delete_contact_submission(id).unwrap());
        assert!(db.get_contact_submission(id).unwrap().is_none());
    }

    #[test]
    fn bad_email_is_rejected() {
        let input = ContactInput { email: "nope".to_string(), ..sample_input(0) };
        assert!(matches!(input.validate(), Err(AppError::Validation(_))));
    }
}
