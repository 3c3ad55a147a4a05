//! Home page: a singleton row of structured landing-page sections. The
//! nested lists are typed and validated here rather than stored as loose
//! JSON blobs.

use anyhow::Result;
use rusqlite::params;
use serde::{Deserialize, Serialize};

use super::{parse_json_list, to_json_text, Database};
use crate::error::{AppError, Validator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub icon: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularDestination {
    pub title: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub comment: String,
    pub rating: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HomePage {
    #[serde(default)]
    pub hero_title: Option<String>,
    #[serde(default)]
    pub hero_subtitle: Option<String>,
    #[serde(default)]
    pub hero_description: Option<String>,
    #[serde(default)]
    pub hero_image: Option<String>,
    #[serde(default)]
    pub why_choose_us_title: Option<String>,
    #[serde(default)]
    pub why_choose_us_features: Vec<Feature>,
    #[serde(default)]
    pub destinations_title: Option<String>,
    #[serde(default)]
    pub destinations_subtitle: Option<String>,
    #[serde(default)]
    pub popular_destinations: Vec<PopularDestination>,
    #[serde(default)]
    pub featured_tours_title: Option<String>,
    #[serde(default)]
    pub featured_tours_subtitle: Option<String>,
    #[serde(default)]
    pub testimonials_title: Option<String>,
    #[serde(default)]
    pub testimonials_subtitle: Option<String>,
    #[serde(default)]
    pub testimonials: Vec<Testimonial>,
    #[serde(default)]
    pub newsletter_title: Option<String>,
    #[serde(default)]
    pub newsletter_description: Option<String>,
}

impl HomePage {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.require(
            "why_choose_us_features",
            self.why_choose_us_features
                .iter()
                .all(|f| !f.title.trim().is_empty() && !f.description.trim().is_empty()),
            "Every feature needs a title and a description",
        );
        v.require(
            "popular_destinations",
            self.popular_destinations
                .iter()
                .all(|d| !d.title.trim().is_empty() && !d.image.trim().is_empty()),
            "Every destination needs a title and an image",
        );
        v.require(
            "testimonials",
            self.testimonials
                .iter()
                .all(|t| !t.name.trim().is_empty() && (1..=5).contains(&t.rating)),
            "Every testimonial needs a name and a rating between 1 and 5",
        );
        v.finish()
    }
}

const HOME_COLUMNS: &str = "hero_title, hero_subtitle, hero_description, hero_image, \
    why_choose_us_title, why_choose_us_features, \
    destinations_title, destinations_subtitle, popular_destinations, \
    featured_tours_title, featured_tours_subtitle, \
    testimonials_title, testimonials_subtitle, testimonials, \
    newsletter_title, newsletter_description";

fn home_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<HomePage> {
    Ok(HomePage {
        hero_title: row.get(0)?,
        hero_subtitle: row.get(1)?,
        hero_description: row.get(2)?,
        hero_image: row.get(3)?,
        why_choose_us_title: row.get(4)?,
        why_choose_us_features: parse_json_list(row.get(5)?),
        destinations_title: row.get(6)?,
        destinations_subtitle: row.get(7)?,
        popular_destinations: parse_json_list(row.get(8)?),
        featured_tours_title: row.get(9)?,
        featured_tours_subtitle: row.get(10)?,
        testimonials_title: row.get(11)?,
        testimonials_subtitle: row.get(12)?,
        testimonials: parse_json_list(row.get(13)?),
        newsletter_title: row.get(14)?,
        newsletter_description: row.get(15)?,
    })
}

impl Database {
    pub fn get_home_page(&self) -> Result<Option<HomePage>> {
        let conn = self.conn()?;
        let result = conn.query_row(
            &format!("SELECT {HOME_COLUMNS} FROM home_page ORDER BY id LIMIT 1"),
            [],
            home_from_row,
        );
        match result {
            Ok(home) => Ok(Some(home)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert on first save, update the existing row afterwards.
    pub fn upsert_home_page(&self, home: &HomePage) -> Result<()> {
        let conn = self.conn()?;
        let existing: Option<i64> =
            match conn.query_row("SELECT id FROM home_page ORDER BY id LIMIT 1", [], |row| {
                row.get(0)
            }) {
                Ok(id) => Some(id),
                Err(rusqlite::Error::QueryReturnedNoRows) => None,
                Err(e) => return Err(e.into()),
            };

        let features = to_json_text(&home.why_choose_us_features)?;
        let destinations = to_json_text(&home.popular_destinations)?;
        let testimonials = to_json_text(&home.testimonials)?;

        match existing {
            Some(id) => {
                let assignments = HOME_COLUMNS
                    .split(',')
                    .map(|c| format!("{} = ?", c.trim()))
                    .collect::<Vec<_>>()
                    .join(", ");
                conn.execute(
                    &format!(
                        "UPDATE home_page SET {assignments}, updated_at = CURRENT_TIMESTAMP \
                         WHERE id = ?"
                    ),
                    params![
                        home.hero_title,
                        home.hero_subtitle,
                        home.hero_description,
                        home.hero_image,
                        home.why_choose_us_title,
                        features,
                        home.destinations_title,
                        home.destinations_subtitle,
                        destinations,
                        home.featured_tours_title,
                        home.featured_tours_subtitle,
                        home.testimonials_title,
                        home.testimonials_subtitle,
                        testimonials,
                        home.newsletter_title,
                        home.newsletter_description,
                        id,
                    ],
                )?;
            }
            None => {
                let placeholders =
                    std::iter::repeat("?").take(16).collect::<Vec<_>>().join(", ");
                conn.execute(
                    &format!("INSERT INTO home_page ({HOME_COLUMNS}) VALUES ({placeholders})"),
                    params![
                        home.hero_title,
                        home.hero_subtitle,
                        home.hero_description,
                        home.hero_image,
                        home.why_choose_us_title,
                        features,
                        home.destinations_title,
                        home.destinations_subtitle,
                        destinations,
                        home.featured_tours_title,
                        home.featured_tours_subtitle,
                        home.testimonials_title,
                        home.testimonials_subtitle,
                        testimonials,
                        home.newsletter_title,
                        home.newsletter_description,
                    ],
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util::open_temp;

    fn sample_home() -> HomePage {
        HomePage {
            hero_title: Some("Discover the island".to_string()),
            hero_image: Some("/uploads/home-hero.jpg".to_string()),
            why_choose_us_features: vec![Feature {
                icon: "map".to_string(),
                title: "Local guides".to_string(),
                description: "Guides who grew up on the routes they drive.".to_string(),
            }],
            popular_destinations: vec![PopularDestination {
                title: "Sigiriya".to_string(),
                image: "/uploads/sigiriya.jpg".to_string(),
                description: None,
            }],
            testimonials: vec![Testimonial {
                name: "Mark".to_string(),
                avatar: Some("/uploads/mark.jpg".to_string()),
                comment: "Flawless trip.".to_string(),
                rating: 5,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn nested_sections_round_trip() {
        let (_dir, db) = open_temp();
        assert!(db.get_home_page().unwrap().is_none());

        db.upsert_home_page(&sample_home()).unwrap();
        let loaded = db.get_home_page().unwrap().unwrap();
        assert_eq!(loaded.why_choose_us_features, sample_home().why_choose_us_features);
        assert_eq!(loaded.popular_destinations[0].title, "Sigiriya");
        assert_eq!(loaded.testimonials[0].rating, 5);

        let mut updated = loaded;
        updated.testimonials.clear();
        db.upsert_home_page(&updated).unwrap();
        let loaded = db.get_home_page().unwrap().unwrap();
        assert!(loaded.testimonials.is_empty());

        let conn = db.conn().unwrap();
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM home_page", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn testimonial_rating_bounds_are_enforced() {
        let mut home = sample_home();
        home.testimonials[0].rating = 9;
        assert!(matches!(home.validate(), Err(AppError::Validation(_))));
    }
}
