use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::errors::ApiError;
use crate::state::AppState;
use crate::users::dto::{
    CreateUserRequest, PatchUserRequest, PublicUser, SearchQuery, UpdateUserRequest,
};
use crate::users::services;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route(
            "/users/:user_id",
            get(get_user)
                .put(update_user)
                .patch(patch_user)
                .delete(delete_user),
        )
}

pub fn search_routes() -> Router<AppState> {
    Router::new().route("/internal/users/search", get(search_users))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    let mut user = services::build_new_user(payload)?;
    state.users().save(&mut user).await?;
    info!(user_id = user.id, email = %user.email, "user created");
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state.users().get(user_id).await?;
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let repo = state.users();
    let mut current = repo.get_with_status(user_id).await?;
    services::apply_update(&mut current, payload)?;
    repo.update(&current).await?;
    info!(user_id, "user updated");
    Ok(Json(PublicUser::from(current)))
}

#[instrument(skip(state, payload))]
pub async fn patch_user(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
    Json(payload): Json<PatchUserRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    services::validate_patch(&payload)?;
    let repo = state.users();
    // fetch with status hydrated, so fields the body omits keep their
    // stored value when the row is overwritten
    let mut current = repo.get_with_status(user_id).await?;
    services::apply_patch(&mut current, payload)?;
    repo.update(&current).await?;
    info!(user_id, "user patched");
    Ok(Json(PublicUser::from(current)))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.users().delete(user_id).await?;
    info!(user_id, "user deleted");
    Ok(Json(serde_json::json!({ "status": "deleted" })))
}

#[instrument(skip(state))]
pub async fn search_users(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = state.users().find_by_status(&q.status).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}
