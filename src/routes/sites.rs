// SPDX-License-Identifier: MIT
// Copyright 2026 Drivedesk Developers

//! Site registry routes.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::error::Result;
use crate::models::{SiteCreate, SiteRecord, SiteUpdate};
use crate::routes::SuccessResponse;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/sites", get(list_sites).post(create_site))
        .route(
            "/api/sites/{id}",
            get(get_site).put(update_site).delete(delete_site),
        )
}

async fn list_sites(State(state): State<Arc<AppState>>) -> Json<Vec<SiteRecord>> {
    Json(state.sites.list())
}

async fn get_site(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SiteRecord>> {
    let site = state.sites.get(&id)?;
    Ok(Json(site))
}

async fn create_site(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SiteCreate>,
) -> Result<Json<SiteRecord>> {
    let site = state.sites.create(body).await?;
    Ok(Json(site))
}

async fn update_site(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<SiteUpdate>,
) -> Result<Json<SiteRecord>> {
    let site = state.sites.update(&id, body).await?;
    Ok(Json(site))
}

async fn delete_site(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    state.sites.delete(&id).await?;
    Ok(Json(SuccessResponse {
        success: true,
        message: format!("Site {} deleted successfully", id),
    }))
}
