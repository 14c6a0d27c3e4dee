// SPDX-License-Identifier: MIT
// Copyright 2026 Drivedesk Developers

//! Local site registry.
//!
//! Sites never touch Drive: the whole list lives under one key in the
//! local KV store, newest first. Creation does require a signed-in
//! credential, which is forwarded to the external QR service as a bearer
//! header. One registry-wide lock serializes every read-modify-write.

use crate::auth::CredentialStore;
use crate::error::AppError;
use crate::models::{SiteCreate, SiteRecord, SiteUpdate};
use crate::services::qr::{QrClient, QrRequest};
use crate::store::{keys, KvStore};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct SiteRegistry {
    kv: KvStore,
    credentials: Arc<CredentialStore>,
    qr: QrClient,
    lock: Arc<Mutex<()>>,
}

impl SiteRegistry {
    pub fn new(kv: KvStore, credentials: Arc<CredentialStore>, qr: QrClient) -> Self {
        Self {
            kv,
            credentials,
            qr,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// The full stored list, newest first; empty when nothing is stored.
    pub fn list(&self) -> Vec<SiteRecord> {
        self.kv.get(keys::SITES).unwrap_or_default()
    }

    pub fn get(&self, id: &str) -> Result<SiteRecord, AppError> {
        self.list()
            .into_iter()
            .find(|site| site.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Site {}", id)))
    }

    /// Validate, obtain a QR code from the external service, and prepend
    /// the new record to the stored list.
    pub async fn create(&self, data: SiteCreate) -> Result<SiteRecord, AppError> {
        let name = data.name.trim().to_string();
        let location = data.location.trim().to_string();
        let folder_link = data.folder_link.trim().to_string();

        if name.is_empty() {
            return Err(AppError::Validation("Site name is required".to_string()));
        }
        if location.is_empty() {
            return Err(AppError::Validation("Site location is required".to_string()));
        }
        if folder_link.is_empty() {
            return Err(AppError::Validation("Folder link is required".to_string()));
        }

        // The credential goes to the QR service, never to Drive.
        let token = self.credentials.get().ok_or(AppError::AuthRequired)?;

        let _guard = self.lock.lock().await;

        let address = data.address.as_deref().unwrap_or(&location);
        let qr = self
            .qr
            .generate(
                &token,
                &QrRequest {
                    site_name: &name,
                    site_location: &location,
                    address,
                    resource_url: &folder_link,
                },
            )
            .await?;

        let now = Utc::now();
        let record = SiteRecord {
            id: derive_site_id(&name, now.timestamp_millis()),
            name,
            location,
            folder_type: data
                .folder_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "GoogleDrive".to_string()),
            folder_link,
            description: data.description.unwrap_or_default(),
            qr_url: qr.image_link().map(str::to_string),
            qr_id: Some(qr.qr_id),
            created_at: now.to_rfc3339(),
            updated_at: now.to_rfc3339(),
            created_by: self.credentials.cached_profile().and_then(|p| p.email),
        };
        tracing::info!(site = %record.id, name = %record.name, "Site created");

        let mut sites = self.list();
        sites.insert(0, record.clone());
        self.kv.set(keys::SITES, &sites)?;
        Ok(record)
    }

    /// Shallow-merge provided fields and rewrite the whole list.
    pub async fn update(&self, id: &str, changes: SiteUpdate) -> Result<SiteRecord, AppError> {
        let _guard = self.lock.lock().await;

        let mut sites = self.list();
        let site = sites
            .iter_mut()
            .find(|site| site.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Site {}", id)))?;

        if let Some(name) = changes.name {
            site.name = name;
        }
        if let Some(location) = changes.location {
            site.location = location;
        }
        if let Some(folder_link) = changes.folder_link {
            site.folder_link = folder_link;
        }
        if let Some(folder_type) = changes.folder_type {
            site.folder_type = folder_type;
        }
        if let Some(description) = changes.description {
            site.description = description;
        }
        site.updated_at = Utc::now().to_rfc3339();

        let updated = site.clone();
        self.kv.set(keys::SITES, &sites)?;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let _guard = self.lock.lock().await;

        let mut sites = self.list();
        let before = sites.len();
        sites.retain(|site| site.id != id);
        if sites.len() == before {
            return Err(AppError::NotFound(format!("Site {}", id)));
        }
        self.kv.set(keys::SITES, &sites)?;
        tracing::info!(site = %id, "Site deleted");
        Ok(())
    }
}

/// Human-legible site id: lowercased name with non-alphanumeric runs
/// collapsed to `_`, trimmed, capped at 20 chars, plus a millisecond
/// suffix for collision resistance within a session.
fn derive_site_id(name: &str, now_millis: i64) -> String {
    let mut slug = String::new();
    let mut pending_separator = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    let slug: String = slug.chars().take(20).collect();
    format!("{}_{}", slug, now_millis)
}
