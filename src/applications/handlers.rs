use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    applications::{
        dto::{ApplicationCreate, ApplicationUpdate, MessageResponse},
        repo::Application,
    },
    auth::services::CurrentUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/applications", get(list_applications).post(create_application))
        .route(
            "/applications/:id",
            get(get_application)
                .put(update_application)
                .delete(delete_application),
        )
}

fn not_found() -> ApiError {
    // Same response whether the id is absent or owned by someone else.
    ApiError::NotFound("Application not found".into())
}

#[instrument(skip(state, user))]
pub async fn list_applications(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Application>>> {
    let apps = Application::list_by_user(&state.db, user.id).await?;
    Ok(Json(apps))
}

#[instrument(skip(state, user, payload))]
pub async fn create_application(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<ApplicationCreate>,
) -> ApiResult<(StatusCode, Json<Application>)> {
    if payload.company_name.trim().is_empty() {
        return Err(ApiError::validation(
            "company_name",
            "Company name must not be blank",
        ));
    }
    if payload.role.trim().is_empty() {
        return Err(ApiError::validation("role", "Role must not be blank"));
    }

    let app = Application::create(&state.db, user.id, payload.into()).await?;
    info!(user_id = %user.id, application_id = %app.id, "application created");
    Ok((StatusCode::CREATED, Json(app)))
}

#[instrument(skip(state, user))]
pub async fn get_application(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Application>> {
    let app = Application::get_by_id(&state.db, user.id, id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(app))
}

#[instrument(skip(state, user, payload))]
pub async fn update_application(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ApplicationUpdate>,
) -> ApiResult<Json<Application>> {
    if let Some(name) = &payload.company_name {
        if name.trim().is_empty() {
            return Err(ApiError::validation(
                "company_name",
                "Company name must not be blank",
            ));
        }
    }
    if let Some(role) = &payload.role {
        if role.trim().is_empty() {
            return Err(ApiError::validation("role", "Role must not be blank"));
        }
    }

    let app = Application::update(&state.db, user.id, id, &payload)
        .await?
        .ok_or_else(not_found)?;
    info!(user_id = %user.id, application_id = %app.id, "application updated");
    Ok(Json(app))
}

#[instrument(skip(state, user))]
pub async fn delete_application(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    if !Application::delete(&state.db, user.id, id).await? {
        return Err(not_found());
    }
    info!(user_id = %user.id, application_id = %id, "application deleted");
    Ok(Json(MessageResponse {
        message: "Application deleted".into(),
    }))
}
