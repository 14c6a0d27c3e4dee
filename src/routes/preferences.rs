// SPDX-License-Identifier: MIT
// Copyright 2026 Drivedesk Developers

//! Persisted UI preferences so the portal state follows the deployment.

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/preferences", get(get_preferences).put(put_preferences))
}

#[derive(Serialize)]
pub struct PreferencesResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    last_folder_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    active_view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    template_draft: Option<serde_json::Value>,
}

#[derive(Deserialize)]
pub struct PreferencesRequest {
    #[serde(default)]
    last_folder_id: Option<String>,
    #[serde(default)]
    active_view: Option<String>,
    #[serde(default)]
    template_draft: Option<serde_json::Value>,
    /// Drop the stored draft (takes precedence over `template_draft`)
    #[serde(default)]
    clear_template_draft: bool,
}

async fn get_preferences(State(state): State<Arc<AppState>>) -> Json<PreferencesResponse> {
    Json(current(&state))
}

async fn put_preferences(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PreferencesRequest>,
) -> Result<Json<PreferencesResponse>> {
    if let Some(folder) = &body.last_folder_id {
        state.preferences.set_last_folder(folder)?;
    }
    if let Some(view) = &body.active_view {
        state.preferences.set_active_view(view)?;
    }
    if body.clear_template_draft {
        state.preferences.clear_template_draft()?;
    } else if let Some(draft) = &body.template_draft {
        state.preferences.set_template_draft(draft)?;
    }

    Ok(Json(current(&state)))
}

fn current(state: &AppState) -> PreferencesResponse {
    PreferencesResponse {
        last_folder_id: state.preferences.last_folder(),
        active_view: state.preferences.active_view(),
        template_draft: state.preferences.template_draft(),
    }
}
