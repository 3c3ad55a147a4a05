//! Sign-in and sign-out: session rows in the database, the token in an
//! HttpOnly cookie.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;

use super::AppState;
use crate::auth::{self, AdminSession, SESSION_COOKIE};
use crate::db::admins::Admin;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct SignInPayload {
    pub email: String,
    pub password: String,
}

/// Verify credentials and open a session. Unknown emails and wrong
/// passwords get the same answer; expiry is enforced server-side on every
/// session lookup, so the cookie itself carries no lifetime.
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<SignInPayload>,
) -> Result<(CookieJar, Json<Admin>), AppError> {
    let Some((admin, hash)) = state.db.find_admin_credentials(&payload.email)? else {
        return Err(AppError::Unauthorized);
    };
    if !auth::verify_password(&payload.password, &hash) {
        return Err(AppError::Unauthorized);
    }

    let token = state.db.create_session(admin.id, state.session_ttl_hours)?;
    tracing::info!("admin {} signed in", admin.email);

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    Ok((jar.add(cookie), Json(admin)))
}

pub async fn sign_out(
    State(state): State<AppState>,
    session: AdminSession,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), AppError> {
    state.db.delete_session(&session.token)?;
    tracing::info!("admin {} signed out", session.admin.email);
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, StatusCode::NO_CONTENT))
}
