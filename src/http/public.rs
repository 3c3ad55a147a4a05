//! Unauthenticated handlers backing the visitor-facing site.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::db::contacts::ContactInput;
use crate::db::destinations::Destination;
use crate::db::home::HomePage;
use crate::db::profile::SiteProfile;
use crate::db::reviews::{Review, ReviewInput};
use crate::db::tours::Tour;
use crate::error::AppError;
use crate::media::MediaLibrary;

/// How many featured tours the landing page shows.
const FEATURED_LIMIT: usize = 3;

pub async fn list_tours(State(state): State<AppState>) -> Result<Json<Vec<Tour>>, AppError> {
    Ok(Json(state.db.list_tours()?))
}

pub async fn featured_tours(State(state): State<AppState>) -> Result<Json<Vec<Tour>>, AppError> {
    Ok(Json(state.db.featured_tours(FEATURED_LIMIT)?))
}

pub async fn get_tour(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Tour>, AppError> {
    let tour = state.db.get_tour(id)?.ok_or(AppError::NotFound("tour"))?;
    Ok(Json(tour))
}

pub async fn list_destinations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Destination>>, AppError> {
    Ok(Json(state.db.list_destinations()?))
}

pub async fn get_destination(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Destination>, AppError> {
    let destination =
        state.db.get_destination(id)?.ok_or(AppError::NotFound("destination"))?;
    Ok(Json(destination))
}

/// Only approved reviews are visible to visitors.
pub async fn list_reviews(State(state): State<AppState>) -> Result<Json<Vec<Review>>, AppError> {
    Ok(Json(state.db.approved_reviews()?))
}

/// New reviews always start unapproved and wait for moderation.
pub async fn submit_review(
    State(state): State<AppState>,
    Json(input): Json<ReviewInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    input.validate()?;
    let id = state.db.create_review(&input)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "Thank you! Your review is awaiting approval." })),
    ))
}

pub async fn get_home(State(state): State<AppState>) -> Result<Json<HomePage>, AppError> {
    let mut home = state.db.get_home_page()?.unwrap_or_default();
    resolve_image(&state.media, &state.placeholder_image, &mut home.hero_image);
    Ok(Json(home))
}

pub async fn get_profile(State(state): State<AppState>) -> Result<Json<SiteProfile>, AppError> {
    let mut profile = state.db.get_site_profile()?.unwrap_or_default();
    for value in [
        &mut profile.about_image,
        &mut profile.tours_hero_image,
        &mut profile.gallery_hero_image,
        &mut profile.about_hero_image,
        &mut profile.contact_hero_image,
        &mut profile.reviews_hero_image,
    ] {
        resolve_image(&state.media, &state.placeholder_image, value);
    }
    Ok(Json(profile))
}

/// Swap a dangling local upload URL for the placeholder so pages never
/// render a broken hero image.
fn resolve_image(media: &MediaLibrary, placeholder: &str, value: &mut Option<String>) {
    if let Some(url) = value.as_deref() {
        if !media.url_resolves(url) {
            tracing::debug!("substituting placeholder for missing upload {url}");
            *value = Some(placeholder.to_string());
        }
    }
}

pub async fn submit_contact(
    State(state): State<AppState>,
    Json(input): Json<ContactInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    input.validate()?;
    let id = state.db.create_contact_submission(&input)?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

#[derive(Debug, Deserialize)]
pub struct VisitPayload {
    pub page: String,
}

/// Analytics beacon. Always answers 204: a failed write is logged but must
/// never surface to the visitor.
pub async fn record_visit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<VisitPayload>,
) -> StatusCode {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok());
    if let Err(err) = state.db.record_visit(&payload.page, user_agent) {
        tracing::warn!("failed to record visit: {err:#}");
    }
    StatusCode::NO_CONTENT
}
