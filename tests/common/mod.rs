// SPDX-License-Identifier: MIT
// Copyright 2026 Drivedesk Developers

//! Shared test support: an in-process fake of the Drive REST surface and
//! the QR service, plus app-state assembly over a tempdir-backed store.

// Each test binary compiles its own copy and uses a different slice of it.
#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{Duration, Utc};
use dashmap::DashMap;
use drivedesk::{config::Config, store::KvStore, AppState};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

/// Skip the test when no TTF font family is installed.
#[macro_export]
macro_rules! require_fonts {
    () => {
        if crate::common::fonts_dir().is_none() {
            eprintln!("⚠️  Skipping: no TTF font family found (set FONTS_DIR)");
            return;
        }
    };
}

/// Locate a directory holding a usable font family, if any.
#[allow(dead_code)]
pub fn fonts_dir() -> Option<PathBuf> {
    let candidates = [
        std::env::var("FONTS_DIR").ok().map(PathBuf::from),
        Some(PathBuf::from("./fonts")),
        Some(PathBuf::from("/usr/share/fonts/truetype/liberation")),
    ];
    for dir in candidates.into_iter().flatten() {
        for family in ["LiberationSans", "Arial"] {
            if dir.join(format!("{}-Regular.ttf", family)).exists() {
                return Some(dir);
            }
        }
    }
    None
}

// ─── Fake Drive ──────────────────────────────────────────────

#[derive(Clone)]
pub struct FakeFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub parents: Vec<String>,
    pub created_time: String,
    pub modified_time: String,
    pub content: Vec<u8>,
}

/// In-memory Drive: a file map plus a log of deleted ids.
pub struct FakeDrive {
    pub files: DashMap<String, FakeFile>,
    pub deleted: Mutex<Vec<String>>,
    next_id: AtomicI64,
    seq: AtomicI64,
}

impl FakeDrive {
    pub fn new() -> Self {
        Self {
            files: DashMap::new(),
            deleted: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            seq: AtomicI64::new(0),
        }
    }

    /// Monotonic timestamps so `modifiedTime desc` ordering is stable.
    fn stamp(&self) -> String {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        (Utc::now() + Duration::seconds(seq)).to_rfc3339()
    }

    pub fn insert(
        &self,
        name: String,
        mime_type: String,
        parents: Vec<String>,
        content: Vec<u8>,
    ) -> FakeFile {
        let id = format!("file_{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let stamp = self.stamp();
        let file = FakeFile {
            id: id.clone(),
            name,
            mime_type,
            parents,
            created_time: stamp.clone(),
            modified_time: stamp,
            content,
        };
        self.files.insert(id, file.clone());
        file
    }

    /// Seed a file directly, bypassing the gateway.
    #[allow(dead_code)]
    pub fn seed(&self, name: &str, mime_type: &str, parent: &str, content: Vec<u8>) -> String {
        self.insert(
            name.to_string(),
            mime_type.to_string(),
            vec![parent.to_string()],
            content,
        )
        .id
    }
}

fn metadata_json(file: &FakeFile) -> serde_json::Value {
    serde_json::json!({
        "id": file.id,
        "name": file.name,
        "mimeType": file.mime_type,
        "createdTime": file.created_time,
        "modifiedTime": file.modified_time,
        "webViewLink": format!("https://drive.example.com/file/d/{}/view", file.id),
        "parents": file.parents,
    })
}

fn check_auth(headers: &HeaderMap) -> Result<(), Response> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let token = value.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() || token == "bad-token" {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "invalid credentials" })),
        )
            .into_response());
    }
    Ok(())
}

/// Parse the subset of Drive query syntax the gateway emits.
fn parse_query(q: &str) -> (Option<String>, Option<String>, Option<String>) {
    let mut parent = None;
    let mut mime = None;
    let mut contains = None;
    for clause in q.split(" and ") {
        let clause = clause.trim();
        if let Some(rest) = clause.strip_suffix("' in parents") {
            parent = rest.strip_prefix('\'').map(str::to_string);
        } else if let Some(rest) = clause.strip_prefix("mimeType='") {
            mime = rest.strip_suffix('\'').map(str::to_string);
        } else if let Some(rest) = clause.strip_prefix("name contains '") {
            contains = rest
                .strip_suffix('\'')
                .map(|s| s.replace("\\'", "'").replace("\\\\", "\\"));
        }
    }
    (parent, mime, contains)
}

async fn list_files(
    State(drive): State<Arc<FakeDrive>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }

    let (parent, mime, contains) =
        parse_query(params.get("q").map(String::as_str).unwrap_or_default());

    let mut files: Vec<FakeFile> = drive
        .files
        .iter()
        .map(|entry| entry.value().clone())
        .filter(|f| parent.as_ref().map_or(true, |p| f.parents.contains(p)))
        .filter(|f| mime.as_ref().map_or(true, |m| &f.mime_type == m))
        .filter(|f| contains.as_ref().map_or(true, |c| f.name.contains(c.as_str())))
        .collect();

    files.sort_by_key(|f| {
        std::cmp::Reverse(
            chrono::DateTime::parse_from_rfc3339(&f.modified_time)
                .map(|d| d.timestamp_millis())
                .unwrap_or(0),
        )
    });
    let page_size: usize = params
        .get("pageSize")
        .and_then(|s| s.parse().ok())
        .unwrap_or(30);
    files.truncate(page_size);

    let files: Vec<serde_json::Value> = files.iter().map(metadata_json).collect();
    Json(serde_json::json!({ "files": files })).into_response()
}

async fn get_file(
    State(drive): State<Arc<FakeDrive>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }
    let Some(file) = drive.files.get(&id).map(|f| f.value().clone()) else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "not found" })),
        )
            .into_response();
    };

    if params.get("alt").map(String::as_str) == Some("media") {
        return ([(header::CONTENT_TYPE, file.mime_type.clone())], file.content).into_response();
    }
    Json(metadata_json(&file)).into_response()
}

async fn patch_file(
    State(drive): State<Arc<FakeDrive>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }
    let Some(mut file) = drive.files.get_mut(&id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "not found" })),
        )
            .into_response();
    };
    if let Some(name) = body.get("name").and_then(|n| n.as_str()) {
        file.name = name.to_string();
    }
    Json(metadata_json(&file)).into_response()
}

async fn delete_file(
    State(drive): State<Arc<FakeDrive>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }
    if drive.files.remove(&id).is_none() {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "not found" })),
        )
            .into_response();
    }
    drive.deleted.lock().unwrap().push(id);
    StatusCode::NO_CONTENT.into_response()
}

async fn create_metadata_file(
    State(drive): State<Arc<FakeDrive>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }
    let file = drive.insert(
        body.get("name")
            .and_then(|n| n.as_str())
            .unwrap_or("unnamed")
            .to_string(),
        body.get("mimeType")
            .and_then(|m| m.as_str())
            .unwrap_or("application/octet-stream")
            .to_string(),
        string_array(body.get("parents")),
        Vec::new(),
    );
    Json(metadata_json(&file)).into_response()
}

async fn create_permission(
    State(_drive): State<Arc<FakeDrive>>,
    headers: HeaderMap,
    Path(_id): Path<String>,
) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }
    Json(serde_json::json!({ "id": "perm_1" })).into_response()
}

async fn upload_create(
    State(drive): State<Arc<FakeDrive>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let Some((metadata, content)) = parse_multipart_related(content_type, &body) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "bad multipart body" })),
        )
            .into_response();
    };

    let file = drive.insert(
        metadata
            .get("name")
            .and_then(|n| n.as_str())
            .unwrap_or("unnamed")
            .to_string(),
        metadata
            .get("mimeType")
            .and_then(|m| m.as_str())
            .unwrap_or("application/octet-stream")
            .to_string(),
        string_array(metadata.get("parents")),
        content,
    );
    Json(metadata_json(&file)).into_response()
}

async fn upload_update(
    State(drive): State<Arc<FakeDrive>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }
    let stamp = drive.stamp();
    let Some(mut file) = drive.files.get_mut(&id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "not found" })),
        )
            .into_response();
    };
    if let Some(mime) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    {
        file.mime_type = mime.to_string();
    }
    file.content = body.to_vec();
    file.modified_time = stamp;
    Json(metadata_json(&file)).into_response()
}

async fn userinfo(headers: HeaderMap) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }
    Json(serde_json::json!({
        "sub": "user-1",
        "name": "Test User",
        "email": "test@example.com",
        "picture": "https://example.com/p.png",
    }))
    .into_response()
}

fn string_array(value: Option<&serde_json::Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|a| {
            a.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Split a `multipart/related` body into its JSON metadata part and raw
/// content part.
fn parse_multipart_related(
    content_type: &str,
    body: &[u8],
) -> Option<(serde_json::Value, Vec<u8>)> {
    let boundary = content_type.split("boundary=").nth(1)?.trim();
    let delimiter = format!("--{}", boundary).into_bytes();

    let mut payloads = Vec::new();
    for part in split_on(body, &delimiter) {
        let Some(at) = find(part, b"\r\n\r\n") else {
            continue;
        };
        let payload = &part[at + 4..];
        let payload = payload.strip_suffix(b"\r\n").unwrap_or(payload);
        payloads.push(payload.to_vec());
    }
    if payloads.len() < 2 {
        return None;
    }

    let metadata = serde_json::from_slice(&payloads[0]).ok()?;
    Some((metadata, payloads[1].clone()))
}

fn split_on<'a>(data: &'a [u8], delimiter: &[u8]) -> Vec<&'a [u8]> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i + delimiter.len() <= data.len() {
        if &data[i..i + delimiter.len()] == delimiter {
            parts.push(&data[start..i]);
            i += delimiter.len();
            start = i;
        } else {
            i += 1;
        }
    }
    parts.push(&data[start..]);
    parts
}

fn find(data: &[u8], needle: &[u8]) -> Option<usize> {
    data.windows(needle.len()).position(|w| w == needle)
}

pub fn fake_drive_router(drive: Arc<FakeDrive>) -> Router {
    Router::new()
        .route("/files", get(list_files).post(create_metadata_file))
        .route(
            "/files/{id}",
            get(get_file).patch(patch_file).delete(delete_file),
        )
        .route("/files/{id}/permissions", post(create_permission))
        .route("/upload/files", post(upload_create))
        .route("/upload/files/{id}", patch(upload_update))
        .route("/userinfo", get(userinfo))
        .with_state(drive)
}

// ─── Fake QR service ─────────────────────────────────────────

async fn generate_qr(headers: HeaderMap, Json(body): Json<serde_json::Value>) -> Response {
    if let Err(response) = check_auth(&headers) {
        return response;
    }
    if body.get("site_name").and_then(|n| n.as_str()) == Some("Fail Site") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "qr exploded" })),
        )
            .into_response();
    }
    Json(serde_json::json!({
        "qr_id": "q1",
        "qr_png_view_link": "http://x/q1.png",
    }))
    .into_response()
}

pub fn fake_qr_router() -> Router {
    Router::new().route("/generate_qr", post(generate_qr))
}

// ─── App assembly ────────────────────────────────────────────

pub async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

pub struct TestContext {
    pub state: Arc<AppState>,
    pub drive: Arc<FakeDrive>,
    _tmp: tempfile::TempDir,
}

/// Fake Drive + fake QR + tempdir-backed KV store, signed in with a
/// fresh test token.
#[allow(dead_code)]
pub async fn test_context() -> TestContext {
    let drive = Arc::new(FakeDrive::new());
    let drive_addr = spawn(fake_drive_router(drive.clone())).await;
    let qr_addr = spawn(fake_qr_router()).await;

    let tmp = tempfile::tempdir().unwrap();
    let base = format!("http://{}", drive_addr);
    let config = Config {
        drive_api_base: base.clone(),
        drive_upload_base: format!("{}/upload", base),
        identity_endpoint: format!("{}/userinfo", base),
        qr_api_base: format!("http://{}", qr_addr),
        data_dir: tmp.path().display().to_string(),
        fonts_dir: fonts_dir()
            .map(|dir| dir.display().to_string())
            .unwrap_or_else(|| "./fonts".to_string()),
        ..Config::default()
    };

    let kv = KvStore::open(&tmp.path().join("state.json")).unwrap();
    let state = Arc::new(AppState::new(config, kv));
    state.credentials.set("test-token", 3600).unwrap();

    TestContext {
        state,
        drive,
        _tmp: tmp,
    }
}
