// SPDX-License-Identifier: MIT
// Copyright 2026 Drivedesk Developers

//! User record service: one JSON file per portal user in the users folder.

use crate::config::Config;
use crate::error::AppError;
use crate::models::{UserCreate, UserRecord, UserUpdate};
use crate::services::drive::{DriveClient, JSON_MIME};
use chrono::Utc;
use dashmap::DashMap;
use futures_util::{stream, StreamExt};
use std::sync::Arc;
use tokio::sync::Mutex;

const MAX_CONCURRENT_FETCHES: usize = 8;

#[derive(Clone)]
pub struct UserService {
    drive: DriveClient,
    folder_id: String,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl UserService {
    pub fn new(config: &Config, drive: DriveClient) -> Self {
        Self {
            drive,
            folder_id: config.users_folder_id.clone(),
            locks: Arc::new(DashMap::new()),
        }
    }

    /// All parseable users, most recently modified first. Malformed or
    /// unreadable documents are logged and dropped.
    pub async fn list(&self) -> Result<Vec<UserRecord>, AppError> {
        let files = self
            .drive
            .list(
                Some(&self.folder_id),
                Some("mimeType='application/json'"),
                None,
            )
            .await?;

        let records: Vec<Option<UserRecord>> = stream::iter(files)
            .map(|file| {
                let drive = self.drive.clone();
                async move {
                    match drive.get_content(&file.id).await {
                        Ok(bytes) => match serde_json::from_slice::<UserRecord>(&bytes) {
                            Ok(mut record) => {
                                record.file_id = Some(file.id.clone());
                                record.file_name = Some(file.name.clone());
                                Some(record)
                            }
                            Err(e) => {
                                tracing::warn!(file = %file.name, error = %e, "Skipping malformed user");
                                None
                            }
                        },
                        Err(e) => {
                            tracing::warn!(file = %file.name, error = %e, "Skipping unreadable user");
                            None
                        }
                    }
                }
            })
            .buffered(MAX_CONCURRENT_FETCHES)
            .collect()
            .await;

        Ok(records.into_iter().flatten().collect())
    }

    pub async fn get(&self, id: &str) -> Result<UserRecord, AppError> {
        let bytes = self.drive.get_content(id).await?;
        let mut record: UserRecord = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(user = %id, error = %e, "Malformed user document");
            AppError::Parse(id.to_string())
        })?;
        record.file_id = Some(id.to_string());
        Ok(record)
    }

    pub async fn create(&self, data: UserCreate) -> Result<UserRecord, AppError> {
        let name = data.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("User name is required".to_string()));
        }

        let now = Utc::now().to_rfc3339();
        let mut record = UserRecord {
            name,
            email: data.email.unwrap_or_default(),
            role: data
                .role
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| "User".to_string()),
            company: data.company.unwrap_or_default(),
            status: data
                .status
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "Active".to_string()),
            created_at: now.clone(),
            updated_at: now,
            file_id: None,
            file_name: None,
        };

        let file_name = user_file_name(&record.name, &record.created_at);
        let parents = [self.folder_id.as_str()];
        let file = self
            .drive
            .create(&file_name, JSON_MIME, &parents, document_json(&record)?.as_bytes())
            .await?;
        tracing::info!(file_id = %file.id, name = %record.name, "User created");

        record.file_id = Some(file.id);
        record.file_name = Some(file.name);
        Ok(record)
    }

    /// Shallow-merge `changes` over the stored record and rewrite it.
    pub async fn update(&self, id: &str, changes: UserUpdate) -> Result<UserRecord, AppError> {
        let lock = self
            .locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let mut record = self.get(id).await?;

        if let Some(name) = changes.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::Validation("User name is required".to_string()));
            }
            record.name = name;
        }
        if let Some(email) = changes.email {
            record.email = email;
        }
        if let Some(role) = changes.role {
            record.role = role;
        }
        if let Some(company) = changes.company {
            record.company = company;
        }
        if let Some(status) = changes.status {
            record.status = status;
        }

        record.updated_at = Utc::now().to_rfc3339();

        self.drive
            .update(id, None, Some(document_json(&record)?.as_bytes()), JSON_MIME)
            .await?;
        Ok(record)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.drive.delete(id).await?;
        tracing::info!(user = %id, "User deleted");
        Ok(())
    }
}

fn document_json(record: &UserRecord) -> Result<String, AppError> {
    let stored = UserRecord {
        file_id: None,
        file_name: None,
        ..record.clone()
    };
    serde_json::to_string_pretty(&stored)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("encode user: {}", e)))
}

fn user_file_name(name: &str, timestamp: &str) -> String {
    let stamp = timestamp.replace(':', "-").replace('.', "-");
    format!("{}_{}.json", name, stamp)
}
