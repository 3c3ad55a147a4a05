//! Session-based admin authentication: bcrypt credential verification plus
//! an extractor that gates every admin route.

use anyhow::{Context, Result};
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;

use crate::db::admins::Admin;
use crate::error::AppError;
use crate::http::AppState;

pub const SESSION_COOKIE: &str = "lankatours_session";

/// Work factor for newly hashed passwords.
const BCRYPT_COST: u32 = 10;

pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, BCRYPT_COST).context("Failed to hash password")
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// The signed-in admin for the current request. Extracting this is the auth
/// gate: requests without a valid, unexpired session are rejected with 401
/// and a sign-in redirect hint.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub admin: Admin,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Unauthorized)?;
        let token = jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .ok_or(AppError::Unauthorized)?;
        let admin = state.db.session_admin(&token)?.ok_or(AppError::Unauthorized)?;
        Ok(AdminSession { admin, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }
}
