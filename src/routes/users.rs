// SPDX-License-Identifier: MIT
// Copyright 2026 Drivedesk Developers

//! User CRUD routes.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::error::Result;
use crate::models::{UserCreate, UserRecord, UserUpdate};
use crate::routes::SuccessResponse;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserRecord>>> {
    let users = state.users.list().await?;
    Ok(Json(users))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserRecord>> {
    let user = state.users.get(&id).await?;
    Ok(Json(user))
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UserCreate>,
) -> Result<Json<UserRecord>> {
    let user = state.users.create(body).await?;
    Ok(Json(user))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UserUpdate>,
) -> Result<Json<UserRecord>> {
    let user = state.users.update(&id, body).await?;
    Ok(Json(user))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    state.users.delete(&id).await?;
    Ok(Json(SuccessResponse {
        success: true,
        message: format!("User {} deleted successfully", id),
    }))
}
