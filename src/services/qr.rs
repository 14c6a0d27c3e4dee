// SPDX-License-Identifier: MIT
// Copyright 2026 Drivedesk Developers

//! Client for the external QR-generation service.

use crate::error::AppError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct QrRequest<'a> {
    pub site_name: &'a str,
    pub site_location: &'a str,
    pub address: &'a str,
    pub resource_url: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QrResponse {
    #[serde(default)]
    pub qr_png_download_link: Option<String>,
    #[serde(default)]
    pub qr_png_view_link: Option<String>,
    pub qr_id: String,
}

impl QrResponse {
    /// The usable image link: download preferred, view as fallback.
    pub fn image_link(&self) -> Option<&str> {
        self.qr_png_download_link
            .as_deref()
            .or(self.qr_png_view_link.as_deref())
    }
}

#[derive(Deserialize)]
struct QrErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// QR service client.
#[derive(Clone)]
pub struct QrClient {
    http: reqwest::Client,
    base_url: String,
}

impl QrClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Generate a QR code for a site resource.
    ///
    /// The credential is forwarded as a bearer header; failures surface the
    /// server-provided error message when one exists, otherwise a generic
    /// status-coded one.
    pub async fn generate(
        &self,
        token: &str,
        request: &QrRequest<'_>,
    ) -> Result<QrResponse, AppError> {
        let response = self
            .http
            .post(format!("{}/generate_qr", self.base_url))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<QrErrorBody>(&body)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| format!("QR generation failed with status {}", status));
            return Err(AppError::QrService { status, message });
        }

        response.json().await.map_err(AppError::from)
    }
}
