//! Destinations shown in the gallery, with an optional map position.

use anyhow::Result;
use rusqlite::params;
use serde::{Deserialize, Serialize};

use super::{parse_json_list, to_json_text, Database, GeoPoint};
use crate::error::{AppError, Validator};

#[derive(Debug, Clone, Serialize)]
pub struct Destination {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Legacy single-cover column. Kept in sync with `images[0]` on every
    /// write; prefer [`Destination::cover_image`] when reading.
    pub image_url: Option<String>,
    pub images: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub locations: Vec<GeoPoint>,
    pub created_at: String,
}

impl Destination {
    /// The cover is the first gallery image, falling back to the legacy
    /// single-image column.
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str).or(self.image_url.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DestinationInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub locations: Vec<GeoPoint>,
}

impl DestinationInput {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.require("title", self.title.trim().len() >= 2, "Title is required");
        v.require(
            "images",
            !self.images.is_empty() || self.image_url.as_deref().is_some_and(|u| !u.is_empty()),
            "At least one image is required",
        );
        v.finish()
    }

    /// Cover derivation applied on every write: images[0] wins, then the
    /// explicitly provided legacy value.
    fn derived_cover(&self) -> Option<&str> {
        self.images
            .first()
            .map(String::as_str)
            .or(self.image_url.as_deref())
            .filter(|u| !u.is_empty())
    }
}

fn destination_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Destination> {
    Ok(Destination {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        image_url: row.get(3)?,
        images: parse_json_list(row.get(4)?),
        latitude: row.get(5)?,
        longitude: row.get(6)?,
        locations: parse_json_list(row.get(7)?),
        created_at: row.get(8)?,
    })
}

const DESTINATION_COLUMNS: &str =
    "id, title, description, image_url, images, latitude, longitude, locations, created_at";

impl Database {
    pub fn list_destinations(&self) -> Result<Vec<Destination>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {DESTINATION_COLUMNS} FROM destinations ORDER BY created_at DESC, id DESC"
        ))?;
        let destinations = stmt
            .query_map([], destination_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(destinations)
    }

    pub fn get_destination(&self, id: i64) -> Result<Option<Destination>> {
        let conn = self.conn()?;
        let result = conn.query_row(
            &format!("SELECT {DESTINATION_COLUMNS} FROM destinations WHERE id = ?"),
            [id],
            destination_from_row,
        );
        match result {
            Ok(destination) => Ok(Some(destination)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn create_destination(&self, input: &DestinationInput) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO destinations (title, description, image_url, images, \
                                       latitude, longitude, locations) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                input.title,
                input.description,
                input.derived_cover(),
                to_json_text(&input.images)?,
                input.latitude,
                input.longitude,
                to_json_text(&input.locations)?,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update_destination(&self, id: i64, input: &DestinationInput) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE destinations SET title = ?, description = ?, image_url = ?, images = ?, \
                                     latitude = ?, longitude = ?, locations = ? \
             WHERE id = ?",
            params![
                input.title,
                input.description,
                input.derived_cover(),
                to_json_text(&input.images)?,
                input.latitude,
                input.longitude,
                to_json_text(&input.locations)?,
                id,
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_destination(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM destinations WHERE id = ?", [id])?;
        Ok(changed > 0)
    }

    pub fn count_destinations(&self) -> Result<i64> {
        let conn = self.conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM destinations", [], |row| row.get(0))?)
    }
}
