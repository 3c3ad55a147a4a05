mod schema;
pub mod admins;
pub mod contacts;
pub mod destinations;
pub mod home;
pub mod profile;
pub mod reviews;
pub mod sessions;
pub mod tours;
pub mod visits;

use anyhow::Result;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use schema::{MIGRATIONS, SCHEMA};

/// A map point attached to tours and destinations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Content-store handle shared across request handlers.
///
/// Wraps an r2d2 pool of SQLite connections; cloning is cheap and every
/// clone talks to the same database file.
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Open (creating if necessary) the database at the given path.
    pub fn open(path: &Path, pool_size: u32) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL;")
        });
        let pool = Pool::builder().max_size(pool_size).build(manager)?;
        Ok(Self { pool })
    }

    pub fn initialize(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA)?;
        for migration in MIGRATIONS {
            let _ = conn.execute(migration, []);
        }
        Ok(())
    }

    pub(crate) fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }
}

/// Parse a JSON list column, tolerating NULL and malformed rows.
///
/// Content written through the API is always valid; anything else (hand
/// edits, partial migrations) degrades to an empty list rather than failing
/// the whole query.
pub(crate) fn parse_json_list<T: DeserializeOwned>(raw: Option<String>) -> Vec<T> {
    let Some(raw) = raw else { return Vec::new() };
    match serde_json::from_str(&raw) {
        Ok(values) => values,
        Err(err) => {
            tracing::warn!("discarding malformed JSON list column: {err}");
            Vec::new()
        }
    }
}

pub(crate) fn to_json_text<T: Serialize>(values: &[T]) -> Result<String> {
    Ok(serde_json::to_string(values)?)
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::Database;
    use tempfile::TempDir;

    /// A fresh initialized database on a temp path, kept alive with its dir.
    pub fn open_temp() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join("test.db"), 2).unwrap();
        db.initialize().unwrap();
        (dir, db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_is_idempotent() {
        let (_dir, db) = test_util::open_temp();
        db.initialize().unwrap();
        db.initialize().unwrap();
    }

    #[test]
    fn parse_json_list_tolerates_garbage() {
        let points: Vec<GeoPoint> = parse_json_list(Some("not json".to_string()));
        assert!(points.is_empty());
        let points: Vec<GeoPoint> =
            parse_json_list(Some(r#"[{"lat":6.9,"lng":79.8,"name":"Colombo"}]"#.to_string()));
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].name.as_deref(), Some("Colombo"));
    }
}
