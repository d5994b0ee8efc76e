use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::{get, post};
use axum::{Router, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::api::deleted;
use crate::db::users::{self, UserFilter};
use crate::error::AppError;
use crate::models::*;
use crate::services::auth;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
struct ProfileQuery {
    user_id: Option<i64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user).patch(update_user).delete(delete_user))
        .route("/user_profiles", get(list_profiles))
        .route("/user_profiles/{id}", get(get_profile).patch(update_profile))
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = auth::register(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<User>, AppError> {
    let user = auth::login(&state.db, req).await?;
    Ok(Json(user))
}

async fn list_users(
    State(state): State<AppState>,
    Query(filter): Query<UserFilter>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = users::fetch_users(&state.db, &filter).await?;
    Ok(Json(users))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, AppError> {
    let user = users::find_user_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(user))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    let user = users::update_user(&state.db, id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(user))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    deleted(users::delete_user(&state.db, id).await?)
}

async fn list_profiles(
    State(state): State<AppState>,
    Query(params): Query<ProfileQuery>,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    let profiles = users::fetch_profiles(&state.db, params.user_id).await?;
    Ok(Json(profiles))
}

async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = users::find_profile_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(profile))
}

async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = users::update_profile(&state.db, id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(profile))
}
