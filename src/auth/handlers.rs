use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest, TokenResponse, UserRead, UserUpdateRequest},
        repo::User,
        services::{hash_password, is_valid_email, verify_password, CurrentUser, JwtKeys},
    },
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/jwt/login", post(login))
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users/me", get(get_me).patch(update_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserRead>)> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::validation("email", "Invalid email"));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::validation("password", "Password too short"));
    }
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("name", "Name must not be blank"));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    // Only the hash crosses into the credential store.
    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, payload.name.trim(), &payload.email, &hash).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(UserRead::from(user))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    payload.email = payload.email.trim().to_lowercase();

    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::BadRequest("Invalid credentials".into()));
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::BadRequest("Invalid credentials".into()));
    }

    if !user.is_active {
        warn!(user_id = %user.id, "login for inactive user");
        return Err(ApiError::BadRequest("Invalid credentials".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(TokenResponse::bearer(access_token)))
}

#[instrument(skip_all)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<UserRead> {
    Json(UserRead::from(user))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(mut payload): Json<UserUpdateRequest>,
) -> ApiResult<Json<UserRead>> {
    if let Some(email) = payload.email.as_mut() {
        *email = email.trim().to_lowercase();
        if !is_valid_email(email) {
            return Err(ApiError::validation("email", "Invalid email"));
        }
    }
    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::validation("name", "Name must not be blank"));
        }
    }

    let updated = User::update_profile(
        &state.db,
        user.id,
        payload.name.as_deref().map(str::trim),
        payload.email.as_deref(),
    )
    .await?;

    info!(user_id = %updated.id, "profile updated");
    Ok(Json(UserRead::from(updated)))
}
