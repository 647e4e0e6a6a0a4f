use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use users_shared::{
    api::{DeleteUserResponse, UserInput, USER_DELETED},
    User, UserRecord,
};

use crate::error::AppError;
use crate::routes::AppState;
use crate::store::StoreError;

/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<UserInput>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let Json(input) = body?;
    let record = UserRecord::from_input(input, Utc::now())?;

    let id = state.store.create(&record).await?;
    tracing::debug!(%id, "created user");

    Ok((StatusCode::CREATED, Json(record.with_id(id))))
}

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let users = state.store.list_all().await?;
    Ok(Json(users))
}

/// GET /users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    let user = state
        .store
        .get_by_id(&id)
        .await?
        .ok_or(StoreError::NotFound)?;

    Ok(Json(user))
}

/// PUT /users/:id
///
/// Responds with the record as written, not a fresh read of the document.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UserInput>, JsonRejection>,
) -> Result<Json<User>, AppError> {
    let Json(input) = body?;
    let record = UserRecord::from_input(input, Utc::now())?;

    state.store.update(&id, &record).await?;
    tracing::debug!(%id, "updated user");

    Ok(Json(record.with_id(id)))
}

/// DELETE /users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteUserResponse>, AppError> {
    state.store.delete(&id).await?;
    tracing::debug!(%id, "deleted user");

    Ok(Json(DeleteUserResponse {
        message: USER_DELETED.to_string(),
    }))
}
