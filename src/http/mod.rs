//! HTTP surface: public content API, session auth, the admin API behind it,
//! and the uploads file server.

pub mod admin;
pub mod auth_routes;
pub mod public;
pub mod uploads;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, post};
use axum::Router;
use std::time::Instant;
use tracing::Instrument;

use crate::db::Database;
use crate::media::MediaLibrary;
use crate::upload::UploadStore;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub uploads: UploadStore,
    pub media: MediaLibrary,
    pub session_ttl_hours: i64,
    pub placeholder_image: String,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Public content API.
        .route("/api/tours", get(public::list_tours))
        .route("/api/tours/featured", get(public::featured_tours))
        .route("/api/tours/:id", get(public::get_tour))
        .route("/api/destinations", get(public::list_destinations))
        .route("/api/destinations/:id", get(public::get_destination))
        .route("/api/reviews", get(public::list_reviews).post(public::submit_review))
        .route("/api/home", get(public::get_home))
        .route("/api/profile", get(public::get_profile))
        .route("/api/contact", post(public::submit_contact))
        .route("/api/visits", post(public::record_visit))
        // Session auth.
        .route("/api/auth/sign-in", post(auth_routes::sign_in))
        .route("/api/auth/sign-out", post(auth_routes::sign_out))
        // Admin API; every handler requires a valid session.
        .route("/api/admin/dashboard", get(admin::dashboard))
        .route("/api/admin/tours", get(admin::list_tours).post(admin::create_tour))
        .route(
            "/api/admin/tours/:id",
            get(admin::get_tour).put(admin::update_tour).delete(admin::delete_tour),
        )
        .route(
            "/api/admin/destinations",
            get(admin::list_destinations).post(admin::create_destination),
        )
        .route(
            "/api/admin/destinations/:id",
            get(admin::get_destination)
                .put(admin::update_destination)
                .delete(admin::delete_destination),
        )
        .route("/api/admin/reviews", get(admin::list_reviews))
        .route("/api/admin/reviews/:id/approve", post(admin::approve_review))
        .route("/api/admin/reviews/:id", delete(admin::delete_review))
        .route("/api/admin/contacts", get(admin::list_contacts))
        .route(
            "/api/admin/contacts/:id",
            get(admin::get_contact)
                .patch(admin::update_contact_status)
                .delete(admin::delete_contact),
        )
        .route("/api/admin/users", get(admin::list_admins).post(admin::create_admin))
        .route(
            "/api/admin/users/:id",
            get(admin::get_admin_account)
                .put(admin::update_admin)
                .delete(admin::delete_admin),
        )
        .route("/api/admin/profile", get(admin::get_profile).put(admin::update_profile))
        .route("/api/admin/home", get(admin::get_home).put(admin::update_home))
        .route("/api/admin/media", get(admin::list_media))
        .route("/api/admin/media/:filename", delete(admin::delete_media))
        .route("/api/admin/uploads", post(admin::upload_files))
        // Uploaded images.
        .route("/uploads/*path", get(uploads::serve_upload))
        .layer(middleware::from_fn(trace_request))
        .with_state(state)
}

/// Wrap every request in a span and log its outcome with latency.
async fn trace_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let span = tracing::info_span!("request", %method, %path);

    let start = Instant::now();
    let response = next.run(request).instrument(span).await;
    let elapsed = start.elapsed();

    let status = response.status();
    if status.is_server_error() {
        tracing::error!(%method, %path, %status, ?elapsed, "request failed");
    } else {
        tracing::info!(%method, %path, %status, ?elapsed, "request");
    }
    response
}
