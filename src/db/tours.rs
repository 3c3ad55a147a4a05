//! Tour packages: CRUD plus the featured listing for the landing page.

use anyhow::Result;
use rusqlite::params;
use serde::{Deserialize, Serialize};

use super::{parse_json_list, to_json_text, Database, GeoPoint};
use crate::error::{AppError, Validator};

#[derive(Debug, Clone, Serialize)]
pub struct Tour {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub duration: String,
    pub location: String,
    pub images: Vec<String>,
    pub locations: Vec<GeoPoint>,
    pub is_featured: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TourInput {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub duration: String,
    pub location: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub locations: Vec<GeoPoint>,
    #[serde(default)]
    pub is_featured: bool,
}

impl TourInput {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.require("title", self.title.trim().len() >= 5, "Title must be at least 5 characters");
        v.require(
            "description",
            self.description.trim().len() >= 20,
            "Description must be at least 20 characters",
        );
        v.require("price", self.price >= 0.0, "Price must be a positive number");
        v.require("duration", self.duration.trim().len() >= 2, "Duration is required");
        v.require("location", self.location.trim().len() >= 2, "Location is required");
        v.require("images", !self.images.is_empty(), "At least one image is required");
        v.finish()
    }
}

fn tour_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tour> {
    Ok(Tour {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        duration: row.get(4)?,
        location: row.get(5)?,
        images: parse_json_list(row.get(6)?),
        locations: parse_json_list(row.get(7)?),
        is_featured: row.get::<_, i64>(8)? != 0,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

const TOUR_COLUMNS: &str = "id, title, description, price, duration, location, \
                            images, locations, is_featured, created_at, updated_at";

impl Database {
    pub fn list_tours(&self) -> Result<Vec<Tour>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TOUR_COLUMNS} FROM tours ORDER BY created_at DESC, id DESC"
        ))?;
        let tours = stmt
            .query_map([], tour_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tours)
    }

    pub fn featured_tours(&self, limit: usize) -> Result<Vec<Tour>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TOUR_COLUMNS} FROM tours WHERE is_featured = 1 \
             ORDER BY created_at DESC, id DESC LIMIT ?"
        ))?;
        let tours = stmt
            .query_map([limit], tour_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tours)
    }

    pub fn get_tour(&self, id: i64) -> Result<Option<Tour>> {
        let conn = self.conn()?;
        let result = conn.query_row(
            &format!("SELECT {TOUR_COLUMNS} FROM tours WHERE id = ?"),
            [id],
            tour_from_row,
        );
        match result {
            Ok(tour) => Ok(Some(tour)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn create_tour(&self, input: &TourInput) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO tours (title, description, price, duration, location, \
                                images, locations, is_featured) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                input.title,
                input.description,
                input.price,
                input.duration,
                input.location,
                to_json_text(&input.images)?,
                to_json_text(&input.locations)?,
                input.is_featured as i64,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update_tour(&self, id: i64, input: &TourInput) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE tours SET title = ?, description = ?, price = ?, duration = ?, \
                              location = ?, images = ?, locations = ?, is_featured = ?, \
                              updated_at = CURRENT_TIMESTAMP \
             WHERE id = ?",
            params![
                input.title,
                input.description,
                input.price,
                input.duration,
                input.location,
                to_json_text(&input.images)?,
                to_json_text(&input.locations)?,
                input.is_featured as i64,
                id,
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_tour(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM tours WHERE id = ?", [id])?;
        Ok(changed > 0)
    }

    pub fn count_tours(&self) -> Result<i64> {
        let conn = self.conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM tours", [], |row| row.get(0))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util::open_temp;

    pub(crate) fn sample_input() -> TourInput {
        TourInput {
            title: "Southern coast escape".to_string(),
            description: "Five days along the beaches and forts of the south coast.".to_string(),
            price: 450.0,
            duration: "5 days".to_string(),
            location: "Galle".to_string(),
            images: vec!["/uploads/a.jpg".to_string(), "/uploads/b.jpg".to_string()],
            locations: vec![GeoPoint { lat: 6.03, lng: 80.22, name: Some("Galle".to_string()) }],
            is_featured: true,
        }
    }

    #[test]
    fn create_get_update_delete() {
        let (_dir, db) = open_temp();
        let id = db.create_tour(&sample_input()).unwrap();

        let tour = db.get_tour(id).unwrap().unwrap();
        assert_eq!(tour.title, "Southern coast escape");
        assert_eq!(tour.images.len(), 2);
        assert_eq!(tour.locations[0].name.as_deref(), Some("Galle"));
        assert!(tour.is_featured);

        let mut input = sample_input();
        input.images = vec!["/uploads/b.jpg".to_string()];
        input.is_featured = false;
        assert!(db.update_tour(id, &input).unwrap());

        let tour = db.get_tour(id).unwrap().unwrap();
        assert_eq!(tour.images, vec!["/uploads/b.jpg"]);
        assert!(!tour.is_featured);

        assert!(db.delete_tour(id).unwrap());
        assert!(db.get_tour(id).unwrap().is_none());
        assert!(!db.delete_tour(id).unwrap());
    }

    #[test]
    fn featured_listing_is_capped() {
        let (_dir, db) = open_temp();
        for i in 0..5 {
            let mut input = sample_input();
            input.title = format!("Featured tour number {i}");
            db.create_tour(&input).unwrap();
        }
        let mut unfeatured = sample_input();
        unfeatured.is_featured = false;
        db.create_tour(&unfeatured).unwrap();

        let featured = db.featured_tours(3).unwrap();
        assert_eq!(featured.len(), 3);
        assert!(featured.iter().all(|t| t.is_featured));
    }

    #[test]
    fn validation_reports_each_field() {
        let input = TourInput {
            title: "abc".to_string(),
            description: "short".to_string(),
            price: -1.0,
            duration: "".to_string(),
            location: "x".to_string(),
            images: Vec::new(),
            locations: Vec::new(),
            is_featured: false,
        };
        let err = input.validate().unwrap_err();
        match err {
            AppError::Validation(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.field).collect();
                assert_eq!(
                    names,
                    vec!["title", "description", "price", "duration", "location", "images"]
                );
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
