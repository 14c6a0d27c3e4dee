// SPDX-License-Identifier: MIT
// Copyright 2026 Drivedesk Developers

//! Authentication routes for the implicit-grant flow.
//!
//! `/auth/google` redirects to the provider; the browser lands back on
//! the frontend with the token in the URL fragment, strips it, and posts
//! it once to `/auth/session`.

use axum::{
    extract::State,
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::{oauth, Profile};
use crate::error::{AppError, Result};
use crate::routes::SuccessResponse;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/google", get(auth_start))
        .route("/auth/session", post(create_session))
        .route("/auth/status", get(auth_status))
        .route("/auth/logout", get(logout))
}

/// Start the OAuth flow - redirect to the provider authorization page.
async fn auth_start(State(state): State<Arc<AppState>>) -> Result<Redirect> {
    let url = oauth::authorization_url(&state.config)?;
    tracing::info!(
        client_id = %state.config.google_client_id,
        "Starting OAuth flow, redirecting to provider"
    );
    Ok(Redirect::temporary(&url))
}

/// Token material captured by the frontend from the redirect fragment.
#[derive(Deserialize)]
pub struct SessionRequest {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
    state: String,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Serialize)]
pub struct AuthStatusResponse {
    authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<Profile>,
}

/// Store the token posted back by the frontend after the redirect.
async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SessionRequest>,
) -> Result<Json<AuthStatusResponse>> {
    if oauth::verify_state(&body.state, &state.config.oauth_state_key).is_none() {
        tracing::warn!("Rejecting session with invalid OAuth state");
        return Err(AppError::Validation("Invalid OAuth state".to_string()));
    }

    state.credentials.set(&body.access_token, body.expires_in)?;

    let user = match state.credentials.get_profile().await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "Profile fetch failed after sign-in");
            None
        }
    };

    tracing::info!("Session established");
    Ok(Json(AuthStatusResponse {
        authenticated: true,
        user,
    }))
}

/// Check if the stored credential is still usable.
async fn auth_status(State(state): State<Arc<AppState>>) -> Result<Json<AuthStatusResponse>> {
    if !state.credentials.is_valid() {
        return Ok(Json(AuthStatusResponse {
            authenticated: false,
            user: None,
        }));
    }

    // A rejected token purges itself here, flipping is_valid below.
    let user = state.credentials.get_profile().await?;
    Ok(Json(AuthStatusResponse {
        authenticated: state.credentials.is_valid(),
        user,
    }))
}

/// End the session and drop the cached profile.
async fn logout(State(state): State<Arc<AppState>>) -> Json<SuccessResponse> {
    state.credentials.clear();
    Json(SuccessResponse {
        success: true,
        message: "Signed out".to_string(),
    })
}
