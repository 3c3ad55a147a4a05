//! Admin accounts. Password hashes never leave this module's internals.

use anyhow::Result;
use rusqlite::params;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Database;
use crate::error::{looks_like_email, AppError, Validator};

#[derive(Debug, Clone, Serialize)]
pub struct Admin {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminInput {
    pub email: String,
    pub name: String,
    /// Required on create, optional on update (blank keeps the old password).
    #[serde(default)]
    pub password: Option<String>,
}

impl AdminInput {
    pub fn validate(&self, password_required: bool) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.require("email", looks_like_email(&self.email), "Invalid email");
        v.require("name", self.name.trim().len() >= 2, "Name is required");
        let password_ok = match self.password.as_deref() {
            Some(p) if !p.is_empty() => p.len() >= 8,
            _ => !password_required,
        };
        v.require(
            "password",
            password_ok,
            if password_required {
                "Password of at least 8 characters is required for new users"
            } else {
                "Password must be at least 8 characters"
            },
        );
        v.finish()
    }
}

#[derive(Debug, Error)]
pub enum DeleteAdminError {
    #[error("you cannot delete your own account")]
    OwnAccount,
    #[error("cannot delete the last admin")]
    LastAdmin,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<DeleteAdminError> for AppError {
    fn from(err: DeleteAdminError) -> Self {
        match err {
            DeleteAdminError::OwnAccount | DeleteAdminError::LastAdmin => {
                AppError::Conflict(err.to_string())
            }
            DeleteAdminError::Other(e) => AppError::Internal(e),
        }
    }
}

fn admin_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Admin> {
    Ok(Admin {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        created_at: row.get(3)?,
    })
}

impl Database {
    pub fn list_admins(&self) -> Result<Vec<Admin>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, email, name, created_at FROM admins ORDER BY created_at DESC, id DESC",
        )?;
        let admins = stmt
            .query_map([], admin_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(admins)
    }

    pub fn get_admin(&self, id: i64) -> Result<Option<Admin>> {
        let conn = self.conn()?;
        let result = conn.query_row(
            "SELECT id, email, name, created_at FROM admins WHERE id = ?",
            [id],
            admin_from_row,
        );
        match result {
            Ok(admin) => Ok(Some(admin)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Admin plus stored password hash, for sign-in verification only.
    pub fn find_admin_credentials(&self, email: &str) -> Result<Option<(Admin, String)>> {
        let conn = self.conn()?;
        let result = conn.query_row(
            "SELECT id, email, name, created_at, password_hash FROM admins WHERE email = ?",
            [email],
            |row| Ok((admin_from_row(row)?, row.get::<_, String>(4)?)),
        );
        match result {
            Ok(found) => Ok(Some(found)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn admin_email_taken(&self, email: &str) -> Result<bool> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM admins WHERE email = ?",
            [email],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn create_admin(&self, email: &str, name: &str, password_hash: &str) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO admins (email, name, password_hash) VALUES (?, ?, ?)",
            params![email, name, password_hash],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// `password_hash = None` keeps the stored password.
    pub fn update_admin(
        &self,
        id: i64,
        email: &str,
        name: &str,
        password_hash: Option<&str>,
    ) -> Result<bool> {
        let conn = self.conn()?;
        let changed = match password_hash {
            Some(hash) => conn.execute(
                "UPDATE admins SET email = ?, name = ?, password_hash = ? WHERE id = ?",
                params![email, name, hash, id],
            )?,
            None => conn.execute(
                "UPDATE admins SET email = ?, name = ? WHERE id = ?",
                params![email, name, id],
            )?,
        };
        Ok(changed > 0)
    }

    /// Delete an admin account, refusing self-deletion and removal of the
    /// last remaining account.
    pub fn delete_admin(&self, id: i64, current_admin_id: i64) -> Result<(), DeleteAdminError> {
        if id == current_admin_id {
            return Err(DeleteAdminError::OwnAccount);
        }
        if self.count_admins().map_err(DeleteAdminError::Other)? <= 1 {
            return Err(DeleteAdminError::LastAdmin);
        }
        let conn = self.conn().map_err(DeleteAdminError::Other)?;
        conn.execute("DELETE FROM admins WHERE id = ?", [id])
            .map_err(|e| DeleteAdminError::Other(e.into()))?;
        Ok(())
    }

    pub fn count_admins(&self) -> Result<i64> {
        let conn = self.conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM admins", [], |row| row.get(0))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util::open_temp;

    #[test]
    fn last_admin_cannot_be_deleted() {
        let (_dir, db) = open_temp();
        let only = db.create_admin("a@example.com", "A", "hash").unwrap();
        let other = db.create_admin("b@example.com", "B", "hash").unwrap();

        // Not last yet: deleting the other account works.
        db.delete_admin(other, only).unwrap();
        assert_eq!(db.count_admins().unwrap(), 1);

        let err = db.delete_admin(only, 999).unwrap_err();
        assert!(matches!(err, DeleteAdminError::LastAdmin));
        assert_eq!(db.count_admins().unwrap(), 1);
    }

    #[test]
    fn self_deletion_is_refused_even_with_other_admins() {
        let (_dir, db) = open_temp();
        let me = db.create_admin("a@example.com", "A", "hash").unwrap();
        db.create_admin("b@example.com", "B", "hash").unwrap();

        let err = db.delete_admin(me, me).unwrap_err();
        assert!(matches!(err, DeleteAdminError::OwnAccount));
        assert_eq!(db.count_admins().unwrap(), 2);
    }

    #[test]
    fn email_uniqueness_is_visible() {
        let (_dir, db) = open_temp();
        db.create_admin("a@example.com", "A", "hash").unwrap();
        assert!(db.admin_email_taken("a@example.com").unwrap());
        assert!(!db.admin_email_taken("b@example.com").unwrap());
    }

    #[test]
    fn password_requirement_depends_on_mode() {
        let input = AdminInput {
            email: "a@example.com".to_string(),
            name: "Admin".to_string(),
            password: None,
        };
        assert!(input.validate(true).is_err());
        assert!(input.validate(false).is_ok());
    }
}
