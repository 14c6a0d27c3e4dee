// SPDX-License-Identifier: MIT
// Copyright 2026 Drivedesk Developers

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    AuthRequired,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Remote store error (HTTP {status}): {message}")]
    RemoteStore { status: u16, message: String },

    #[error("Failed to parse record: {0}")]
    Parse(String),

    #[error("QR service error (HTTP {status}): {message}")]
    QrService { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Local store error: {0}")]
    Store(String),

    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::AuthRequired => (StatusCode::UNAUTHORIZED, "auth_required", None),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_failed", Some(msg.clone()))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::RemoteStore { status, message } => {
                tracing::warn!(status = *status, message = %message, "Remote store error");
                (StatusCode::BAD_GATEWAY, "remote_store_error", Some(message.clone()))
            }
            AppError::Parse(msg) => (StatusCode::BAD_GATEWAY, "parse_failed", Some(msg.clone())),
            AppError::QrService { status, message } => {
                tracing::warn!(status = *status, message = %message, "QR service error");
                (StatusCode::BAD_GATEWAY, "qr_service_error", Some(message.clone()))
            }
            AppError::Request(err) => {
                tracing::warn!(error = %err, "Outbound request failed");
                (StatusCode::BAD_GATEWAY, "request_failed", None)
            }
            AppError::Store(msg) => {
                tracing::error!(error = %msg, "Local store error");
                (StatusCode::INTERNAL_SERVER_ERROR, "store_error", None)
            }
            AppError::Pdf(msg) => {
                tracing::error!(error = %msg, "PDF rendering error");
                (StatusCode::INTERNAL_SERVER_ERROR, "pdf_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
