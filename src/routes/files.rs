// SPDX-License-Identifier: MIT
// Copyright 2026 Drivedesk Developers

//! Raw file routes: a thin proxy over the Drive gateway.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::routes::SuccessResponse;
use crate::services::DriveFile;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/files", get(list_files).post(create_file))
        .route(
            "/api/files/{id}",
            get(get_file).put(update_file).delete(delete_file),
        )
        .route("/api/files/{id}/content", get(get_file_content))
        .route("/api/files/upload", post(upload_file))
        .route("/api/folders", post(create_folder))
        .route("/api/share", post(create_share_link))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesParams {
    #[serde(default)]
    folder_id: Option<String>,
    /// Extra Drive query predicate ANDed into the folder constraint
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    page_size: Option<u32>,
}

/// List files, most recently modified first.
async fn list_files(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListFilesParams>,
) -> Result<Json<Vec<DriveFile>>> {
    if let Some(folder) = &params.folder_id {
        if let Err(e) = state.preferences.set_last_folder(folder) {
            tracing::warn!(error = %e, "Failed to persist last folder");
        }
    }

    let files = state
        .drive
        .list(
            params.folder_id.as_deref(),
            params.query.as_deref(),
            params.page_size,
        )
        .await?;
    Ok(Json(files))
}

#[derive(Deserialize)]
pub struct GetFileParams {
    #[serde(default)]
    fields: Option<String>,
}

async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<GetFileParams>,
) -> Result<Json<DriveFile>> {
    let file = state.drive.get_metadata(&id, params.fields.as_deref()).await?;
    Ok(Json(file))
}

/// Fetch file content. Text-like files come back as `{"content": ...}`,
/// anything else as raw bytes with its MIME type.
async fn get_file_content(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response> {
    let metadata = state.drive.get_metadata(&id, Some("id,name,mimeType")).await?;
    let bytes = state.drive.get_content(&id).await?;

    let mime = metadata
        .mime_type
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let text_like = mime.starts_with("text/")
        || matches!(
            mime.as_str(),
            "application/json" | "application/javascript" | "application/xml"
        );

    if text_like {
        let content = String::from_utf8_lossy(&bytes).into_owned();
        return Ok(Json(serde_json::json!({ "content": content })).into_response());
    }
    Ok(([(header::CONTENT_TYPE, mime)], bytes).into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileRequest {
    name: String,
    #[serde(default = "default_text_mime")]
    mime_type: String,
    #[serde(default)]
    parents: Vec<String>,
    #[serde(default)]
    content: String,
}

fn default_text_mime() -> String {
    "text/plain".to_string()
}

async fn create_file(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateFileRequest>,
) -> Result<Json<DriveFile>> {
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("File name is required".to_string()));
    }

    let parents: Vec<&str> = body.parents.iter().map(String::as_str).collect();
    let file = state
        .drive
        .create(&body.name, &body.mime_type, &parents, body.content.as_bytes())
        .await?;
    Ok(Json(file))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFileRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default = "default_text_mime")]
    mime_type: String,
}

async fn update_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateFileRequest>,
) -> Result<Json<DriveFile>> {
    let file = state
        .drive
        .update(
            &id,
            body.name.as_deref(),
            body.content.as_deref().map(str::as_bytes),
            &body.mime_type,
        )
        .await?;
    Ok(Json(file))
}

async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    state.drive.delete(&id).await?;
    Ok(Json(SuccessResponse {
        success: true,
        message: format!("File {} deleted successfully", id),
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadParams {
    folder: String,
    name: String,
    #[serde(default = "default_octet_mime")]
    mime_type: String,
}

fn default_octet_mime() -> String {
    "application/octet-stream".to_string()
}

/// Raw byte upload into a folder.
async fn upload_file(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<Json<DriveFile>> {
    if body.is_empty() {
        return Err(AppError::Validation("No file content provided".to_string()));
    }

    let file = state
        .drive
        .create(
            &params.name,
            &params.mime_type,
            &[params.folder.as_str()],
            &body,
        )
        .await?;
    Ok(Json(file))
}

#[derive(Deserialize)]
pub struct CreateFolderRequest {
    name: String,
    #[serde(default)]
    parents: Vec<String>,
}

async fn create_folder(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateFolderRequest>,
) -> Result<Json<DriveFile>> {
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("Folder name is required".to_string()));
    }

    let parents: Vec<&str> = body.parents.iter().map(String::as_str).collect();
    let folder = state.drive.create_folder(&body.name, &parents).await?;
    Ok(Json(folder))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    file_id: String,
}

async fn create_share_link(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ShareRequest>,
) -> Result<Json<serde_json::Value>> {
    let link = state.drive.create_shareable_link(&body.file_id).await?;
    Ok(Json(serde_json::json!({ "link": link })))
}
