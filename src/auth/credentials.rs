// SPDX-License-Identifier: MIT
// Copyright 2026 Drivedesk Developers

//! Credential store: one bearer token, its expiry, and the cached user
//! profile, persisted in the local KV store.
//!
//! The store is injected explicitly into the gateway and the record
//! services; nothing reads ambient global auth state. Sign-in/out is
//! broadcast on a watch channel whose receivers own their lifetime.

use crate::error::AppError;
use crate::store::{keys, KvStore};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// Current authentication state, broadcast to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    SignedOut,
    SignedIn,
}

/// Cached user profile from the provider's identity endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Provider-assigned subject id
    #[serde(rename = "sub")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Avatar URL
    #[serde(rename = "picture", default)]
    pub image: Option<String>,
}

pub struct CredentialStore {
    kv: KvStore,
    http: reqwest::Client,
    identity_endpoint: String,
    auth_tx: Arc<watch::Sender<AuthState>>,
}

impl CredentialStore {
    pub fn new(kv: KvStore, identity_endpoint: String) -> Self {
        let initial = if kv.contains(keys::ACCESS_TOKEN) {
            AuthState::SignedIn
        } else {
            AuthState::SignedOut
        };
        let (auth_tx, _) = watch::channel(initial);

        Self {
            kv,
            http: reqwest::Client::new(),
            identity_endpoint,
            auth_tx: Arc::new(auth_tx),
        }
    }

    /// True iff a token and an expiry are stored and the expiry is in the
    /// future. An expired (or malformed) expiry purges the credential as a
    /// side effect, so a stale token can never be read after this check.
    pub fn is_valid(&self) -> bool {
        let has_token = self.kv.contains(keys::ACCESS_TOKEN);
        let expiry: Option<String> = self.kv.get(keys::TOKEN_EXPIRY);

        let Some(expiry) = expiry else {
            if has_token {
                self.purge_token();
            }
            return false;
        };
        if !has_token {
            return false;
        }

        let still_valid = DateTime::parse_from_rfc3339(&expiry)
            .map(|expiry| Utc::now() < expiry)
            .unwrap_or(false);
        if !still_valid {
            self.purge_token();
        }
        still_valid
    }

    /// The stored token, or `None` when absent or expired.
    pub fn get(&self) -> Option<String> {
        if self.is_valid() {
            self.kv.get(keys::ACCESS_TOKEN)
        } else {
            None
        }
    }

    /// Store a fresh token with the given lifetime and broadcast sign-in.
    pub fn set(&self, token: &str, ttl_seconds: i64) -> Result<(), AppError> {
        let expiry = (Utc::now() + Duration::seconds(ttl_seconds)).to_rfc3339();
        self.kv.set(keys::ACCESS_TOKEN, &token)?;
        self.kv.set(keys::TOKEN_EXPIRY, &expiry)?;
        self.auth_tx.send_replace(AuthState::SignedIn);
        Ok(())
    }

    /// Drop the token and expiry (the provider rejected it or it aged out).
    /// The cached profile is left in place; `clear` removes everything.
    pub fn purge_token(&self) {
        if let Err(e) = self.kv.remove(keys::ACCESS_TOKEN) {
            tracing::warn!(error = %e, "Failed to remove stored token");
        }
        if let Err(e) = self.kv.remove(keys::TOKEN_EXPIRY) {
            tracing::warn!(error = %e, "Failed to remove stored expiry");
        }
        self.auth_tx.send_replace(AuthState::SignedOut);
    }

    /// End the session: token, expiry, and cached profile all go.
    pub fn clear(&self) {
        self.purge_token();
        if let Err(e) = self.kv.remove(keys::USER_PROFILE) {
            tracing::warn!(error = %e, "Failed to remove cached profile");
        }
    }

    /// Subscribe to sign-in/out transitions.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.auth_tx.subscribe()
    }

    /// The cached profile, without touching the network.
    pub fn cached_profile(&self) -> Option<Profile> {
        self.kv.get(keys::USER_PROFILE)
    }

    /// The user profile: cached if present, otherwise fetched from the
    /// identity endpoint and cached. A rejected token (401) purges the
    /// credential and yields `None` rather than an error.
    pub async fn get_profile(&self) -> Result<Option<Profile>, AppError> {
        if let Some(profile) = self.cached_profile() {
            return Ok(Some(profile));
        }

        let Some(token) = self.get() else {
            return Ok(None);
        };

        let response = self
            .http
            .get(&self.identity_endpoint)
            .bearer_auth(&token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            tracing::info!("Identity endpoint rejected the token, purging");
            self.purge_token();
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(AppError::RemoteStore { status, message });
        }

        let profile: Profile = response.json().await?;
        if let Err(e) = self.kv.set(keys::USER_PROFILE, &profile) {
            tracing::warn!(error = %e, "Failed to cache profile");
        }
        Ok(Some(profile))
    }
}
