// SPDX-License-Identifier: MIT
// Copyright 2026 Drivedesk Developers

//! Template CRUD routes.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{TemplateCreate, TemplateRecord, TemplateUpdate};
use crate::pdf::{self, Layout, RenderOptions, RenderTarget};
use crate::routes::SuccessResponse;
use crate::services::TemplateUpdateOutcome;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/templates", get(list_templates).post(create_template))
        .route(
            "/api/templates/{id}",
            get(get_template).put(update_template).delete(delete_template),
        )
        .route("/api/templates/{id}/pdf", get(download_template_pdf))
}

async fn list_templates(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TemplateRecord>>> {
    let templates = state.templates.list().await?;
    Ok(Json(templates))
}

async fn get_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TemplateRecord>> {
    let template = state.templates.get(&id).await?;
    Ok(Json(template))
}

async fn create_template(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TemplateCreate>,
) -> Result<Json<TemplateRecord>> {
    let template = state.templates.create(body).await?;
    Ok(Json(template))
}

/// Full-replace update; the response carries the advisory `pdf_status`.
async fn update_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<TemplateUpdate>,
) -> Result<Json<TemplateUpdateOutcome>> {
    let outcome = state.templates.update(&id, body).await?;
    Ok(Json(outcome))
}

async fn delete_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    state.templates.delete(&id).await?;
    Ok(Json(SuccessResponse {
        success: true,
        message: format!("Template {} deleted successfully", id),
    }))
}

#[derive(Deserialize)]
pub struct PdfParams {
    /// "table" for the plain listing; anything else renders the form
    #[serde(default)]
    layout: Option<String>,
}

/// Render the template on demand, without touching the stored companion.
async fn download_template_pdf(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<PdfParams>,
) -> Result<Response> {
    let template = state.templates.get(&id).await?;
    let layout = match params.layout.as_deref() {
        Some("table") => Layout::Table,
        _ => Layout::Questionnaire,
    };

    let bytes = pdf::render(
        std::path::Path::new(&state.config.fonts_dir),
        &template,
        RenderOptions {
            layout,
            target: RenderTarget::Bytes,
        },
    )?
    .unwrap_or_default();

    Ok(([(header::CONTENT_TYPE, "application/pdf")], bytes).into_response())
}
