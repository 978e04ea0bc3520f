use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::jwt::JwtKeys;
use crate::auth::repo::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Identity resolved from a bearer token. Extracting this is the access
/// guard for a route: handlers taking an `AuthUser` only run for requests
/// carrying a valid token whose subject still exists.
///
/// Every rejection is the same uniform 401; clients never learn whether the
/// token was missing, malformed, forged, expired, or stale.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                warn!("missing Authorization header");
                ApiError::Unauthorized
            })?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                warn!("invalid Authorization scheme");
                ApiError::Unauthorized
            })?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "token rejected");
            ApiError::Unauthorized
        })?;

        // The subject must still resolve to a live row; tokens outlive
        // nothing.
        let user = User::find_by_id(&state.db, claims.sub)
            .await
            .map_err(|e| ApiError::Internal(e.into()))?
            .ok_or_else(|| {
                warn!(user_id = %claims.sub, "token subject no longer exists");
                ApiError::Unauthorized
            })?;

        Ok(AuthUser {
            id: user.id,
            email: user.email,
            name: user.name,
        })
    }
}
