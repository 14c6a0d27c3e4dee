// SPDX-License-Identifier: MIT
// Copyright 2026 Drivedesk Developers

//! Remote file gateway: direct Drive v3 REST calls.
//!
//! Handles:
//! - File listing with folder/predicate queries
//! - Metadata and raw content fetches
//! - Multipart create and media content updates
//! - Folder creation and shareable links
//!
//! Every operation requires a valid credential; a 401 from Drive purges
//! the stored token so callers see `AuthRequired` from then on.

use crate::auth::CredentialStore;
use crate::config::Config;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Folder MIME type on Drive.
pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
pub const JSON_MIME: &str = "application/json";
pub const PDF_MIME: &str = "application/pdf";

const DEFAULT_PAGE_SIZE: u32 = 30;
const LIST_FIELDS: &str = "files(id,name,mimeType,createdTime,modifiedTime,webViewLink)";
const FILE_FIELDS: &str = "id,name,mimeType,createdTime,modifiedTime,webViewLink,parents";

/// Boundary for hand-assembled multipart/related upload bodies.
const MULTIPART_BOUNDARY: &str = "drivedesk_upload_boundary";

/// One object in the remote store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub modified_time: Option<String>,
    #[serde(default)]
    pub web_view_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

/// Drive REST client.
#[derive(Clone)]
pub struct DriveClient {
    http: reqwest::Client,
    api_base: String,
    upload_base: String,
    credentials: Arc<CredentialStore>,
}

impl DriveClient {
    pub fn new(config: &Config, credentials: Arc<CredentialStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: config.drive_api_base.clone(),
            upload_base: config.drive_upload_base.clone(),
            credentials,
        }
    }

    /// The stored bearer token, or `AuthRequired`.
    fn token(&self) -> Result<String, AppError> {
        self.credentials.get().ok_or(AppError::AuthRequired)
    }

    /// List files, most recently modified first.
    ///
    /// `folder_id` constrains to direct children; `filter` is an extra
    /// Drive query predicate ANDed in.
    pub async fn list(
        &self,
        folder_id: Option<&str>,
        filter: Option<&str>,
        page_size: Option<u32>,
    ) -> Result<Vec<DriveFile>, AppError> {
        let token = self.token()?;

        let query = match (folder_id, filter) {
            (Some(folder), Some(filter)) => format!("'{}' in parents and {}", folder, filter),
            (Some(folder), None) => format!("'{}' in parents", folder),
            (None, Some(filter)) => filter.to_string(),
            (None, None) => String::new(),
        };

        let mut request = self
            .http
            .get(format!("{}/files", self.api_base))
            .bearer_auth(&token)
            .query(&[
                ("pageSize", page_size.unwrap_or(DEFAULT_PAGE_SIZE).to_string()),
                ("fields", LIST_FIELDS.to_string()),
                ("orderBy", "modifiedTime desc".to_string()),
            ]);
        if !query.is_empty() {
            request = request.query(&[("q", query)]);
        }

        let response = request.send().await?;
        let list: FileList = self.check_response_json(response).await?;
        Ok(list.files)
    }

    /// Get file metadata with an explicit field set.
    pub async fn get_metadata(
        &self,
        id: &str,
        fields: Option<&str>,
    ) -> Result<DriveFile, AppError> {
        let token = self.token()?;
        let response = self
            .http
            .get(format!("{}/files/{}", self.api_base, id))
            .bearer_auth(&token)
            .query(&[("fields", fields.unwrap_or(FILE_FIELDS))])
            .send()
            .await?;
        self.check_response_json(response).await
    }

    /// Fetch raw file content (`alt=media`, distinct from metadata calls).
    pub async fn get_content(&self, id: &str) -> Result<Vec<u8>, AppError> {
        let token = self.token()?;
        let response = self
            .http
            .get(format!("{}/files/{}", self.api_base, id))
            .bearer_auth(&token)
            .query(&[("alt", "media")])
            .send()
            .await?;
        let response = self.check_response(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Create a file with content, as a multipart body pairing a JSON
    /// metadata part with a content part.
    ///
    /// Drive wants `multipart/related`, which reqwest's form support does
    /// not produce, so the body is assembled by hand.
    pub async fn create(
        &self,
        name: &str,
        mime_type: &str,
        parents: &[&str],
        content: &[u8],
    ) -> Result<DriveFile, AppError> {
        let token = self.token()?;

        let mut metadata = serde_json::json!({ "name": name, "mimeType": mime_type });
        if !parents.is_empty() {
            metadata["parents"] = serde_json::json!(parents);
        }

        let mut body = Vec::with_capacity(content.len() + 512);
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Type: {JSON_MIME}; charset=UTF-8\r\n\r\n{metadata}\r\n--{boundary}\r\nContent-Type: {mime_type}\r\n\r\n",
                boundary = MULTIPART_BOUNDARY,
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());

        let response = self
            .http
            .post(format!("{}/files", self.upload_base))
            .bearer_auth(&token)
            .query(&[("uploadType", "multipart"), ("fields", FILE_FIELDS)])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", MULTIPART_BOUNDARY),
            )
            .body(body)
            .send()
            .await?;
        self.check_response_json(response).await
    }

    /// Update a file. Name and content are independent sub-operations;
    /// content, when given, fully replaces the prior bytes.
    pub async fn update(
        &self,
        id: &str,
        name: Option<&str>,
        content: Option<&[u8]>,
        mime_type: &str,
    ) -> Result<DriveFile, AppError> {
        let token = self.token()?;

        if let Some(name) = name {
            let response = self
                .http
                .patch(format!("{}/files/{}", self.api_base, id))
                .bearer_auth(&token)
                .json(&serde_json::json!({ "name": name }))
                .send()
                .await?;
            self.check_response(response).await?;
        }

        if let Some(content) = content {
            let response = self
                .http
                .patch(format!("{}/files/{}", self.upload_base, id))
                .bearer_auth(&token)
                .query(&[("uploadType", "media"), ("fields", FILE_FIELDS)])
                .header(reqwest::header::CONTENT_TYPE, mime_type)
                .body(content.to_vec())
                .send()
                .await?;
            return self.check_response_json(response).await;
        }

        // Only metadata changed; return the updated file.
        self.get_metadata(id, None).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let token = self.token()?;
        let response = self
            .http
            .delete(format!("{}/files/{}", self.api_base, id))
            .bearer_auth(&token)
            .send()
            .await?;
        self.check_response(response).await?;
        Ok(())
    }

    /// Create a folder (metadata-only create with the folder MIME type).
    pub async fn create_folder(
        &self,
        name: &str,
        parents: &[&str],
    ) -> Result<DriveFile, AppError> {
        let token = self.token()?;

        let mut metadata = serde_json::json!({ "name": name, "mimeType": FOLDER_MIME });
        if !parents.is_empty() {
            metadata["parents"] = serde_json::json!(parents);
        }

        let response = self
            .http
            .post(format!("{}/files", self.api_base))
            .bearer_auth(&token)
            .query(&[("fields", FILE_FIELDS)])
            .json(&metadata)
            .send()
            .await?;
        self.check_response_json(response).await
    }

    /// Grant anyone-with-the-link read access and return the view link.
    pub async fn create_shareable_link(&self, id: &str) -> Result<String, AppError> {
        let token = self.token()?;

        let response = self
            .http
            .post(format!("{}/files/{}/permissions", self.api_base, id))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "role": "reader", "type": "anyone" }))
            .send()
            .await?;
        self.check_response(response).await?;

        let file = self.get_metadata(id, Some("webViewLink")).await?;
        file.web_view_link
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("file {} has no webViewLink", id)))
    }

    /// Check response status; non-2xx becomes `RemoteStore` (or purges the
    /// token and becomes `AuthRequired` on 401).
    async fn check_response(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, AppError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();

        if status == 401 {
            tracing::info!("Drive rejected the token, purging stored credential");
            self.credentials.purge_token();
            return Err(AppError::AuthRequired);
        }

        Err(AppError::RemoteStore { status, message })
    }

    /// Check response and parse the JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        let response = self.check_response(response).await?;
        response.json().await.map_err(AppError::from)
    }
}
