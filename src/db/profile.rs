//! Site profile: a singleton row holding contact info, hero images and SEO
//! metadata. Created on first save, updated in place thereafter.

use anyhow::Result;
use rusqlite::params;
use serde::{Deserialize, Serialize};

use super::Database;
use crate::error::{AppError, Validator};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteProfile {
    #[serde(default)]
    pub about_text: Option<String>,
    #[serde(default)]
    pub about_image: Option<String>,
    #[serde(default)]
    pub tours_hero_image: Option<String>,
    #[serde(default)]
    pub tours_hero_color: Option<String>,
    #[serde(default)]
    pub gallery_hero_image: Option<String>,
    #[serde(default)]
    pub gallery_hero_color: Option<String>,
    #[serde(default)]
    pub about_hero_image: Option<String>,
    #[serde(default)]
    pub about_hero_color: Option<String>,
    #[serde(default)]
    pub contact_hero_image: Option<String>,
    #[serde(default)]
    pub contact_hero_color: Option<String>,
    #[serde(default)]
    pub reviews_hero_image: Option<String>,
    #[serde(default)]
    pub reviews_hero_color: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub facebook_url: Option<String>,
    #[serde(default)]
    pub instagram_url: Option<String>,
    #[serde(default)]
    pub tiktok_url: Option<String>,
    #[serde(default)]
    pub site_title: Option<String>,
    #[serde(default)]
    pub site_description: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub nav_color: Option<String>,
}

impl SiteProfile {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            v.require("email", crate::error::looks_like_email(email), "Invalid email");
        }
        for (field, value) in [
            ("facebook_url", &self.facebook_url),
            ("instagram_url", &self.instagram_url),
            ("tiktok_url", &self.tiktok_url),
        ] {
            if let Some(url) = value.as_deref().filter(|u| !u.is_empty()) {
                v.require(
                    field,
                    url.starts_with("http://") || url.starts_with("https://"),
                    "Invalid URL",
                );
            }
        }
        v.finish()
    }

    /// The image fields scanned by media reconciliation and the
    /// replaced-image cleanup on profile updates.
    pub fn image_fields(&self) -> [(&'static str, Option<&str>); 6] {
        [
            ("about_image", self.about_image.as_deref()),
            ("tours_hero_image", self.tours_hero_image.as_deref()),
            ("gallery_hero_image", self.gallery_hero_image.as_deref()),
            ("about_hero_image", self.about_hero_image.as_deref()),
            ("contact_hero_image", self.contact_hero_image.as_deref()),
            ("reviews_hero_image", self.reviews_hero_image.as_deref()),
        ]
    }
}

const PROFILE_COLUMNS: &str = "about_text, about_image, \
    tours_hero_image, tours_hero_color, gallery_hero_image, gallery_hero_color, \
    about_hero_image, about_hero_color, contact_hero_image, contact_hero_color, \
    reviews_hero_image, reviews_hero_color, \
    email, phone, address, facebook_url, instagram_url, tiktok_url, \
    site_title, site_description, keywords, nav_color";

fn profile_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SiteProfile> {
    Ok(SiteProfile {
        about_text: row.get(0)?,
        about_image: row.get(1)?,
        tours_hero_image: row.get(2)?,
        tours_hero_color: row.get(3)?,
        gallery_hero_image: row.get(4)?,
        gallery_hero_color: row.get(5)?,
        about_hero_image: row.get(6)?,
        about_hero_color: row.get(7)?,
        contact_hero_image: row.get(8)?,
        contact_hero_color: row.get(9)?,
        reviews_hero_image: row.get(10)?,
        reviews_hero_color: row.get(11)?,
        email: row.get(12)?,
        phone: row.get(13)?,
        address: row.get(14)?,
        facebook_url: row.get(15)?,
        instagram_url: row.get(16)?,
        tiktok_url: row.get(17)?,
        site_title: row.get(18)?,
        site_description: row.get(19)?,
        keywords: row.get(20)?,
        nav_color: row.get(21)?,
    })
}

impl Database {
    /// The singleton profile row, if one has been saved yet.
    pub fn get_site_profile(&self) -> Result<Option<SiteProfile>> {
        let conn = self.conn()?;
        let result = conn.query_row(
            &format!("SELECT {PROFILE_COLUMNS} FROM site_profile ORDER BY id LIMIT 1"),
            [],
            profile_from_row,
        );
        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert on first save, update the existing row afterwards.
    pub fn upsert_site_profile(&self, profile: &SiteProfile) -> Result<()> {
        let conn = self.conn()?;
        let existing: Option<i64> = match conn.query_row(
            "SELECT id FROM site_profile ORDER BY id LIMIT 1",
            [],
            |row| row.get(0),
        ) {
            Ok(id) => Some(id),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(e.into()),
        };

        match existing {
            Some(id) => {
                let assignments = PROFILE_COLUMNS
                    .split(',')
                    .map(|c| format!("{} = ?", c.trim()))
                    .collect::<Vec<_>>()
                    .join(", ");
                conn.execute(
                    &format!(
                        "UPDATE site_profile SET {assignments}, updated_at = CURRENT_TIMESTAMP \
                         WHERE id = ?"
                    ),
                    params![
                        profile.about_text,
                        profile.about_image,
                        profile.tours_hero_image,
                        profile.tours_hero_color,
                        profile.gallery_hero_image,
                        profile.gallery_hero_color,
                        profile.about_hero_image,
                        profile.about_hero_color,
                        profile.contact_hero_image,
                        profile.contact_hero_color,
                        profile.reviews_hero_image,
                        profile.reviews_hero_color,
                        profile.email,
                        profile.phone,
                        profile.address,
                        profile.facebook_url,
                        profile.instagram_url,
                        profile.tiktok_url,
                        profile.site_title,
                        profile.site_description,
                        profile.keywords,
                        profile.nav_color,
                        id,
                    ],
                )?;
            }
            None => {
                let placeholders =
                    std::iter::repeat("?").take(22).collect::<Vec<_>>().join(", ");
                conn.execute(
                    &format!(
                        "INSERT INTO site_profile ({PROFILE_COLUMNS}) VALUES ({placeholders})"
                    ),
                    params![
                        profile.about_text,
                        profile.about_image,
                        profile.tours_hero_image,
                        profile.tours_hero_color,
                        profile.gallery_hero_image,
                        profile.gallery_hero_color,
                        profile.about_hero_image,
                        profile.about_hero_color,
                        profile.contact_hero_image,
                        profile.contact_hero_color,
                        profile.reviews_hero_image,
                        profile.reviews_hero_color,
                        profile.email,
                        profile.phone,
                        profile.address,
                        profile.facebook_url,
                        profile.instagram_url,
                        profile.tiktok_url,
                        profile.site_title,
                        profile.site_description,
                        profile.keywords,
                        profile.nav_color,
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

    #[test]
    fn first_save_creates_then_updates_in_place() {
        let (_dir, db) = open_temp();
        assert!(db.get_site_profile().unwrap().is_none());

        let profile = SiteProfile {
            site_title: Some("Silvin Lanka".to_string()),
            email: Some("hello@example.com".to_string()),
            tours_hero_image: Some("/uploads/hero.jpg".to_string()),
            ..Default::default()
        };
        db.upsert_site_profile(&profile).unwrap();

        let loaded = db.get_site_profile().unwrap().unwrap();
        assert_eq!(loaded.site_title.as_deref(), Some("Silvin Lanka"));

        let updated = SiteProfile { phone: Some("+94 11 234 5678".to_string()), ..loaded };
        db.upsert_site_profile(&updated).unwrap();

        let conn = db.conn().unwrap();
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM site_profile", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 1);

        let loaded = db.get_site_profile().unwrap().unwrap();
        assert_eq!(loaded.phone.as_deref(), Some("+94 11 234 5678"));
        assert_eq!(loaded.tours_hero_image.as_deref(), Some("/uploads/hero.jpg"));
    }

    #[test]
    fn social_urls_are_validated() {
        let profile = SiteProfile {
            facebook_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(matches!(profile.validate(), Err(AppError::Validation(_))));
    }
}
