//! Opaque-token admin sessions with lazy expiry cleanup.

use anyhow::Result;
use chrono::{Duration, Utc};
use rusqlite::params;

use super::admins::Admin;
use super::Database;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl Database {
    /// Issue a session for the admin and return the token.
    pub fn create_session(&self, admin_id: i64, ttl_hours: i64) -> Result<String> {
        let token = uuid::Uuid::new_v4().to_string();
        let expires_at = (Utc::now() + Duration::hours(ttl_hours))
            .format(TIMESTAMP_FORMAT)
            .to_string();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO sessions (token, admin_id, expires_at) VALUES (?, ?, ?)",
            params![token, admin_id, expires_at],
        )?;
        Ok(token)
    }

    /// Resolve a token to its admin, dropping expired rows as a side effect.
    pub fn session_admin(&self, token: &str) -> Result<Option<Admin>> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM sessions WHERE expires_at <= datetime('now')", [])?;

        let result = conn.query_row(
            "SELECT a.id, a.email, a.name, a.created_at \
             FROM sessions s JOIN admins a ON a.id = s.admin_id \
             WHERE s.token = ?",
            [token],
            |row| {
                Ok(Admin {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    name: row.get(2)?,
                    created_at: row.get(3)?,
                })
            },
        );
        match result {
            Ok(admin) => Ok(Some(admin)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn delete_session(&self, token: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM sessions WHERE token = ?", [token])?;
        Ok(())
    }
}
