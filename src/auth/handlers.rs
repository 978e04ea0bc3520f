use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{
            AuthResponse, ChangePasswordRequest, LoginRequest, MessageResponse, PublicUser,
            RegisterRequest, UpdateProfileRequest,
        },
        extractors::AuthUser,
        jwt::JwtKeys,
        services,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
        .route("/auth/profile", put(update_profile))
        .route("/auth/password", put(change_password))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let user = services::register(&state.db, &payload.name, &payload.email, &payload.password)
        .await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = services::login(&state.db, &payload.email, &payload.password).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

#[instrument(skip_all)]
pub async fn me(user: AuthUser) -> Json<PublicUser> {
    Json(PublicUser {
        id: user.id,
        name: user.name,
        email: user.email,
    })
}

/// Stateless logout: tokens carry no server-side session to tear down, so
/// this only acknowledges; the client discards the token.
#[instrument(skip_all)]
pub async fn logout(user: AuthUser) -> Json<MessageResponse> {
    info!(user_id = %user.id, "user logged out");
    Json(MessageResponse {
        message: "Logout successful",
    })
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let updated =
        services::update_profile(&state.db, user.id, &payload.name, &payload.email).await?;
    Ok(Json(updated.into()))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::change_password(
        &state.db,
        user.id,
        &payload.current_password,
        &payload.new_password,
    )
    .await?;
    Ok(Json(MessageResponse {
        message: "Password changed successfully",
    }))
}
