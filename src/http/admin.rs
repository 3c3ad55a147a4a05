//! Session-gated admin handlers: content CRUD, moderation, the contact
//! inbox, account management, media reconciliation and uploads.
//!
//! Every handler takes an [`AdminSession`]; extraction failing is the 401.

use anyhow::Context;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::auth::{self, AdminSession};
use crate::db::admins::{Admin, AdminInput};
use crate::db::contacts::{ContactPage, ContactStatus, ContactSubmission};
use crate::db::destinations::{Destination, DestinationInput};
use crate::db::home::HomePage;
use crate::db::profile::SiteProfile;
use crate::db::reviews::Review;
use crate::db::tours::{Tour, TourInput};
use crate::error::AppError;
use crate::media::{cleanup, MediaFile};

// ---- dashboard ----

/// How many of each content type feed the recent-activity list, and how
/// many entries it shows after merging.
const RECENT_PER_KIND: usize = 3;
const RECENT_TOTAL: usize = 5;

pub async fn dashboard(
    State(state): State<AppState>,
    _session: AdminSession,
) -> Result<Json<serde_json::Value>, AppError> {
    let counts = json!({
        "tours": state.db.count_tours()?,
        "destinations": state.db.count_destinations()?,
        "reviews": state.db.count_reviews()?,
        "admins": state.db.count_admins()?,
        "visits": state.db.count_visits()?,
    });

    // Newest tours and reviews interleaved by creation time.
    let mut recent: Vec<(String, serde_json::Value)> = Vec::new();
    for tour in state.db.list_tours()?.into_iter().take(RECENT_PER_KIND) {
        recent.push((
            tour.created_at.clone(),
            json!({ "type": "tour", "id": tour.id, "title": tour.title,
                    "created_at": tour.created_at }),
        ));
    }
    for review in state.db.list_reviews()?.into_iter().take(RECENT_PER_KIND) {
        recent.push((
            review.created_at.clone(),
            json!({ "type": "review", "id": review.id, "name": review.name,
                    "rating": review.rating, "created_at": review.created_at }),
        ));
    }
    recent.sort_by(|a, b| b.0.cmp(&a.0));
    let recent_activity: Vec<_> =
        recent.into_iter().take(RECENT_TOTAL).map(|(_, entry)| entry).collect();

    Ok(Json(json!({ "counts": counts, "recent_activity": recent_activity })))
}

// ---- tours ----

pub async fn list_tours(
    State(state): State<AppState>,
    _session: AdminSession,
) -> Result<Json<Vec<Tour>>, AppError> {
    Ok(Json(state.db.list_tours()?))
}

pub async fn get_tour(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
) -> Result<Json<Tour>, AppError> {
    let tour = state.db.get_tour(id)?.ok_or(AppError::NotFound("tour"))?;
    Ok(Json(tour))
}

pub async fn create_tour(
    State(state): State<AppState>,
    _session: AdminSession,
    Json(input): Json<TourInput>,
) -> Result<(StatusCode, Json<Tour>), AppError> {
    input.validate()?;
    let id = state.db.create_tour(&input)?;
    let tour = state.db.get_tour(id)?.ok_or(AppError::NotFound("tour"))?;
    Ok((StatusCode::CREATED, Json(tour)))
}

/// Update a tour; images dropped from its list are unlinked afterwards.
pub async fn update_tour(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
    Json(input): Json<TourInput>,
) -> Result<Json<Tour>, AppError> {
    input.validate()?;
    let existing = state.db.get_tour(id)?.ok_or(AppError::NotFound("tour"))?;
    state.db.update_tour(id, &input)?;
    cleanup::remove_stale_uploads(state.uploads.dir(), &existing.images, &input.images);
    let tour = state.db.get_tour(id)?.ok_or(AppError::NotFound("tour"))?;
    Ok(Json(tour))
}

pub async fn delete_tour(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let existing = state.db.get_tour(id)?.ok_or(AppError::NotFound("tour"))?;
    state.db.delete_tour(id)?;
    cleanup::remove_uploads(state.uploads.dir(), &existing.images);
    Ok(StatusCode::NO_CONTENT)
}

// ---- destinations ----

fn destination_urls(image_url: &Option<String>, images: &[String]) -> Vec<String> {
    let mut urls: Vec<String> = image_url.iter().cloned().collect();
    urls.extend(images.iter().cloned());
    urls
}

pub async fn list_destinations(
    State(state): State<AppState>,
    _session: AdminSession,
) -> Result<Json<Vec<Destination>>, AppError> {
    Ok(Json(state.db.list_destinations()?))
}

pub async fn get_destination(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
) -> Result<Json<Destination>, AppError> {
    let destination =
        state.db.get_destination(id)?.ok_or(AppError::NotFound("destination"))?;
    Ok(Json(destination))
}

pub async fn create_destination(
    State(state): State<AppState>,
    _session: AdminSession,
    Json(input): Json<DestinationInput>,
) -> Result<(StatusCode, Json<Destination>), AppError> {
    input.validate()?;
    let id = state.db.create_destination(&input)?;
    let destination =
        state.db.get_destination(id)?.ok_or(AppError::NotFound("destination"))?;
    Ok((StatusCode::CREATED, Json(destination)))
}

pub async fn update_destination(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
    Json(input): Json<DestinationInput>,
) -> Result<Json<Destination>, AppError> {
    input.validate()?;
    let existing =
        state.db.get_destination(id)?.ok_or(AppError::NotFound("destination"))?;
    state.db.update_destination(id, &input)?;

    let old = destination_urls(&existing.image_url, &existing.images);
    let updated =
        state.db.get_destination(id)?.ok_or(AppError::NotFound("destination"))?;
    let new = destination_urls(&updated.image_url, &updated.images);
    cleanup::remove_stale_uploads(state.uploads.dir(), &old, &new);
    Ok(Json(updated))
}

pub async fn delete_destination(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let existing =
        state.db.get_destination(id)?.ok_or(AppError::NotFound("destination"))?;
    state.db.delete_destination(id)?;
    let urls = destination_urls(&existing.image_url, &existing.images);
    cleanup::remove_uploads(state.uploads.dir(), &urls);
    Ok(StatusCode::NO_CONTENT)
}

// ---- reviews ----

pub async fn list_reviews(
    State(state): State<AppState>,
    _session: AdminSession,
) -> Result<Json<Vec<Review>>, AppError> {
    Ok(Json(state.db.list_reviews()?))
}

pub async fn approve_review(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !state.db.approve_review(id)? {
        return Err(AppError::NotFound("review"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_review(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !state.db.delete_review(id)? {
        return Err(AppError::NotFound("review"));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---- contact inbox ----

#[derive(Debug, Deserialize)]
pub struct InboxQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

pub async fn list_contacts(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<InboxQuery>,
) -> Result<Json<ContactPage>, AppError> {
    Ok(Json(state.db.list_contact_submissions(query.page, query.limit)?))
}

pub async fn get_contact(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
) -> Result<Json<ContactSubmission>, AppError> {
    let submission =
        state.db.get_contact_submission(id)?.ok_or(AppError::NotFound("submission"))?;
    Ok(Json(submission))
}

#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    pub status: ContactStatus,
}

pub async fn update_contact_status(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
    Json(payload): Json<StatusPayload>,
) -> Result<StatusCode, AppError> {
    if !state.db.update_contact_status(id, payload.status)? {
        return Err(AppError::NotFound("submission"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_contact(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !state.db.delete_contact_submission(id)? {
        return Err(AppError::NotFound("submission"));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---- admin accounts ----

pub async fn list_admins(
    State(state): State<AppState>,
    _session: AdminSession,
) -> Result<Json<Vec<Admin>>, AppError> {
    Ok(Json(state.db.list_admins()?))
}

pub async fn get_admin_account(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
) -> Result<Json<Admin>, AppError> {
    let admin = state.db.get_admin(id)?.ok_or(AppError::NotFound("admin"))?;
    Ok(Json(admin))
}

pub async fn create_admin(
    State(state): State<AppState>,
    _session: AdminSession,
    Json(input): Json<AdminInput>,
) -> Result<(StatusCode, Json<Admin>), AppError> {
    input.validate(true)?;
    if state.db.admin_email_taken(&input.email)? {
        return Err(AppError::conflict("An account with this email already exists"));
    }
    let password = input.password.as_deref().unwrap_or_default();
    let hash = auth::hash_password(password)?;
    let id = state.db.create_admin(&input.email, &input.name, &hash)?;
    let admin = state.db.get_admin(id)?.ok_or(AppError::NotFound("admin"))?;
    Ok((StatusCode::CREATED, Json(admin)))
}

/// A blank or missing password keeps the stored one.
pub async fn update_admin(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
    Json(input): Json<AdminInput>,
) -> Result<Json<Admin>, AppError> {
    input.validate(false)?;
    let existing = state.db.get_admin(id)?.ok_or(AppError::NotFound("admin"))?;
    if input.email != existing.email && state.db.admin_email_taken(&input.email)? {
        return Err(AppError::conflict("An account with this email already exists"));
    }
    let hash = match input.password.as_deref() {
        Some(p) if !p.is_empty() => Some(auth::hash_password(p)?),
        _ => None,
    };
    state.db.update_admin(id, &input.email, &input.name, hash.as_deref())?;
    let admin = state.db.get_admin(id)?.ok_or(AppError::NotFound("admin"))?;
    Ok(Json(admin))
}

pub async fn delete_admin(
    State(state): State<AppState>,
    session: AdminSession,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if state.db.get_admin(id)?.is_none() {
        return Err(AppError::NotFound("admin"));
    }
    state.db.delete_admin(id, session.admin.id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- site profile ----

fn profile_image_urls(profile: &SiteProfile) -> Vec<String> {
    profile
        .image_fields()
        .into_iter()
        .filter_map(|(_, value)| value.map(str::to_string))
        .collect()
}

pub async fn get_profile(
    State(state): State<AppState>,
    _session: AdminSession,
) -> Result<Json<SiteProfile>, AppError> {
    Ok(Json(state.db.get_site_profile()?.unwrap_or_default()))
}

/// Save the profile singleton; any image a field no longer points at is
/// unlinked afterwards.
pub async fn update_profile(
    State(state): State<AppState>,
    _session: AdminSession,
    Json(profile): Json<SiteProfile>,
) -> Result<Json<SiteProfile>, AppError> {
    profile.validate()?;
    let old = state.db.get_site_profile()?.unwrap_or_default();
    state.db.upsert_site_profile(&profile)?;
    cleanup::remove_stale_uploads(
        state.uploads.dir(),
        &profile_image_urls(&old),
        &profile_image_urls(&profile),
    );
    Ok(Json(profile))
}

// ---- home page ----

fn home_image_urls(home: &HomePage) -> Vec<String> {
    let mut urls: Vec<String> = home.hero_image.iter().cloned().collect();
    urls.extend(home.popular_destinations.iter().map(|d| d.image.clone()));
    urls.extend(home.testimonials.iter().filter_map(|t| t.avatar.clone()));
    urls
}

pub async fn get_home(
    State(state): State<AppState>,
    _session: AdminSession,
) -> Result<Json<HomePage>, AppError> {
    Ok(Json(state.db.get_home_page()?.unwrap_or_default()))
}

pub async fn update_home(
    State(state): State<AppState>,
    _session: AdminSession,
    Json(home): Json<HomePage>,
) -> Result<Json<HomePage>, AppError> {
    home.validate()?;
    let old = state.db.get_home_page()?.unwrap_or_default();
    state.db.upsert_home_page(&home)?;
    cleanup::remove_stale_uploads(
        state.uploads.dir(),
        &home_image_urls(&old),
        &home_image_urls(&home),
    );
    Ok(Json(home))
}

// ---- media library ----

pub async fn list_media(
    State(state): State<AppState>,
    _session: AdminSession,
) -> Result<Json<Vec<MediaFile>>, AppError> {
    Ok(Json(state.media.list(&state.db)))
}

/// Delete one file from the uploads directory. Files still referenced by
/// content are refused; remove the reference first.
pub async fn delete_media(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(filename): Path<String>,
) -> Result<StatusCode, AppError> {
    if filename.contains("..") || filename.contains('/') {
        return Err(AppError::NotFound("media file"));
    }
    let files = state.media.list(&state.db);
    let file = files
        .iter()
        .find(|f| f.name == filename)
        .ok_or(AppError::NotFound("media file"))?;
    if file.is_active {
        return Err(AppError::conflict(
            "This file is still in use; remove its references before deleting it",
        ));
    }
    state.media.delete(&filename)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- uploads ----

/// Accept one or more image files from a multipart form and return their
/// public URLs. Empty parts are skipped rather than rejected.
pub async fn upload_files(
    State(state): State<AppState>,
    _session: AdminSession,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let mut urls = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .context("Failed to read multipart field")?
    {
        if !matches!(field.name(), Some("file") | Some("files")) {
            continue;
        }
        let original_name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| "upload".to_string());
        let bytes = field.bytes().await.context("Failed to read upload body")?;
        if bytes.is_empty() {
            continue;
        }
        urls.push(state.uploads.save(&original_name, &bytes)?);
    }

    if urls.is_empty() {
        return Err(AppError::Validation(vec![crate::error::FieldError::new(
            "file",
            "No file was provided",
        )]));
    }
    Ok((StatusCode::CREATED, Json(json!({ "urls": urls }))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::home::{PopularDestination, Testimonial};

    #[test]
    fn destination_urls_include_cover_and_gallery() {
        let urls = destination_urls(
            &Some("/uploads/cover.jpg".to_string()),
            &["/uploads/a.jpg".to_string(), "/uploads/b.jpg".to_string()],
        );
        assert_eq!(urls, ["/uploads/cover.jpg", "/uploads/a.jpg", "/uploads/b.jpg"]);
        assert!(destination_urls(&None, &[]).is_empty());
    }

    #[test]
    fn home_urls_cover_every_image_slot() {
        let home = HomePage {
            hero_image: Some("/uploads/hero.jpg".to_string()),
            popular_destinations: vec![PopularDestination {
                title: "Galle".to_string(),
                image: "/uploads/galle.jpg".to_string(),
                description: None,
            }],
            testimonials: vec![
                Testimonial {
                    name: "Mark".to_string(),
                    avatar: Some("/uploads/mark.jpg".to_string()),
                    comment: "Great".to_string(),
                    rating: 5,
                },
                Testimonial {
                    name: "Jo".to_string(),
                    avatar: None,
                    comment: "Also great".to_string(),
                    rating: 4,
                },
            ],
            ..Default::default()
        };
        let urls = home_image_urls(&home);
        assert_eq!(urls, ["/uploads/hero.jpg", "/uploads/galle.jpg", "/uploads/mark.jpg"]);
    }

    #[test]
    fn profile_urls_skip_unset_fields() {
        let profile = SiteProfile {
            about_image: Some("/uploads/about.jpg".to_string()),
            reviews_hero_image: Some("/uploads/reviews.jpg".to_string()),
            ..Default::default()
        };
        let urls = profile_image_urls(&profile);
        assert_eq!(urls, ["/uploads/about.jpg", "/uploads/reviews.jpg"]);
    }
}
