// SPDX-License-Identifier: MIT
// Copyright 2026 Drivedesk Developers

//! Template record service.
//!
//! Maps an inspection template onto two files in the templates folder:
//! the JSON document and a rendered PDF companion. The companion's Drive
//! id is stored on the record itself (`pdfFileId`); a name search of the
//! folder remains only as a fallback for documents written before that
//! field existed.

use crate::config::Config;
use crate::error::AppError;
use crate::models::{Question, TemplateCreate, TemplateRecord, TemplateUpdate};
use crate::pdf::{self, Layout, RenderOptions, RenderTarget};
use crate::services::drive::{DriveClient, JSON_MIME, PDF_MIME};
use chrono::Utc;
use dashmap::DashMap;
use futures_util::{stream, StreamExt};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Content fetches during `list` overlap up to this many requests;
/// `buffered` keeps the listing order.
const MAX_CONCURRENT_FETCHES: usize = 8;

/// What happened to the PDF companion during an update.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum CompanionStatus {
    Updated,
    Created,
    Failed(String),
}

/// Update result: the record plus the advisory companion status.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateUpdateOutcome {
    #[serde(flatten)]
    pub template: TemplateRecord,
    pub pdf_status: CompanionStatus,
}

#[derive(Clone)]
pub struct TemplateService {
    drive: DriveClient,
    folder_id: String,
    fonts_dir: PathBuf,
    /// Per-record mutex so a double submission serializes instead of racing.
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl TemplateService {
    pub fn new(config: &Config, drive: DriveClient) -> Self {
        Self {
            drive,
            folder_id: config.templates_folder_id.clone(),
            fonts_dir: PathBuf::from(&config.fonts_dir),
            locks: Arc::new(DashMap::new()),
        }
    }

    /// All parseable templates in the folder, most recently modified first.
    /// Malformed or unreadable documents are logged and dropped.
    pub async fn list(&self) -> Result<Vec<TemplateRecord>, AppError> {
        let files = self
            .drive
            .list(
                Some(&self.folder_id),
                Some("mimeType='application/json'"),
                None,
            )
            .await?;

        let records: Vec<Option<TemplateRecord>> = stream::iter(files)
            .map(|file| {
                let drive = self.drive.clone();
                async move {
                    match drive.get_content(&file.id).await {
                        Ok(bytes) => match serde_json::from_slice::<TemplateRecord>(&bytes) {
                            Ok(mut record) => {
                                record.file_id = Some(file.id.clone());
                                record.file_name = Some(file.name.clone());
                                Some(record)
                            }
                            Err(e) => {
                                tracing::warn!(file = %file.name, error = %e, "Skipping malformed template");
                                None
                            }
                        },
                        Err(e) => {
                            tracing::warn!(file = %file.name, error = %e, "Skipping unreadable template");
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

    /// Fetch one template by file id. Parse failures surface here.
    pub async fn get(&self, id: &str) -> Result<TemplateRecord, AppError> {
        let bytes = self.drive.get_content(id).await?;
        let mut record: TemplateRecord = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(template = %id, error = %e, "Malformed template document");
            AppError::Parse(id.to_string())
        })?;
        record.file_id = Some(id.to_string());

        if record.pdf_file_id.is_none() {
            // legacy documents predate the stored companion id
            record.pdf_file_id = self.find_companion(&record.name).await;
        }
        Ok(record)
    }

    /// Validate, stamp, write the JSON document, render the companion PDF,
    /// and store the companion id back on the document.
    pub async fn create(&self, data: TemplateCreate) -> Result<TemplateRecord, AppError> {
        let name = data.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Template name is required".to_string()));
        }
        let questions: Vec<Question> = data
            .questions
            .into_iter()
            .filter(|q| !q.text.trim().is_empty())
            .collect();
        if questions.is_empty() {
            return Err(AppError::Validation(
                "At least one question with text is required".to_string(),
            ));
        }

        let now = Utc::now().to_rfc3339();
        let mut record = TemplateRecord {
            name,
            category: data
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| "General".to_string()),
            description: data.description.unwrap_or_default(),
            questions,
            status: "Active".to_string(),
            version: "1.0".to_string(),
            created_at: now.clone(),
            updated_at: now,
            pdf_file_id: None,
            file_id: None,
            file_name: None,
        };

        let parents = [self.folder_id.as_str()];
        let json_name = record_file_name(&record.name, &record.created_at, "json");
        let file = self
            .drive
            .create(&json_name, JSON_MIME, &parents, document_json(&record)?.as_bytes())
            .await?;
        tracing::info!(file_id = %file.id, name = %record.name, "Template created");

        // Companion PDF, then a content rewrite so the stored document
        // carries the companion id.
        let bytes = self.render_pdf(&record)?;
        let pdf_name = record_file_name(&record.name, &record.created_at, "pdf");
        let pdf_file = self.drive.create(&pdf_name, PDF_MIME, &parents, &bytes).await?;
        record.pdf_file_id = Some(pdf_file.id);
        self.drive
            .update(&file.id, None, Some(document_json(&record)?.as_bytes()), JSON_MIME)
            .await?;

        record.file_id = Some(file.id);
        record.file_name = Some(file.name);
        Ok(record)
    }

    /// Shallow-merge `changes` over the stored record, bump the version and
    /// `updatedAt`, and rewrite the document. The companion PDF refresh is
    /// advisory: its failure never fails the update.
    pub async fn update(
        &self,
        id: &str,
        changes: TemplateUpdate,
    ) -> Result<TemplateUpdateOutcome, AppError> {
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
                return Err(AppError::Validation("Template name is required".to_string()));
            }
            record.name = name;
        }
        if let Some(category) = changes.category {
            record.category = category;
        }
        if let Some(description) = changes.description {
            record.description = description;
        }
        if let Some(questions) = changes.questions {
            let questions: Vec<Question> = questions
                .into_iter()
                .filter(|q| !q.text.trim().is_empty())
                .collect();
            if questions.is_empty() {
                return Err(AppError::Validation(
                    "At least one question with text is required".to_string(),
                ));
            }
            record.questions = questions;
        }
        if let Some(status) = changes.status {
            record.status = status;
        }

        record.version = bump_version(&record.version);
        record.updated_at = Utc::now().to_rfc3339();

        self.drive
            .update(id, None, Some(document_json(&record)?.as_bytes()), JSON_MIME)
            .await?;

        let pdf_status = match self.refresh_companion(&mut record, id).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(template = %id, error = %e, "Companion PDF refresh failed");
                CompanionStatus::Failed(e.to_string())
            }
        };

        Ok(TemplateUpdateOutcome {
            template: record,
            pdf_status,
        })
    }

    /// Delete the companion first, then the JSON document; a companion
    /// failure leaves the record intact rather than half-deleted.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let lock = self
            .locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let pdf_file_id = match self.get(id).await {
            Ok(record) => record.pdf_file_id,
            // unreadable document: delete the file alone
            Err(AppError::Parse(_)) => None,
            Err(e) => return Err(e),
        };

        if let Some(pdf_id) = pdf_file_id {
            self.drive.delete(&pdf_id).await?;
        }
        self.drive.delete(id).await?;
        tracing::info!(template = %id, "Template deleted");
        Ok(())
    }

    fn render_pdf(&self, record: &TemplateRecord) -> Result<Vec<u8>, AppError> {
        pdf::render(
            &self.fonts_dir,
            record,
            RenderOptions {
                layout: Layout::Questionnaire,
                target: RenderTarget::Bytes,
            },
        )?
        .ok_or_else(|| AppError::Pdf("renderer returned no bytes".to_string()))
    }

    async fn refresh_companion(
        &self,
        record: &mut TemplateRecord,
        id: &str,
    ) -> Result<CompanionStatus, AppError> {
        let bytes = self.render_pdf(record)?;
        match record.pdf_file_id.clone() {
            Some(pdf_id) => {
                self.drive
                    .update(&pdf_id, None, Some(&bytes), PDF_MIME)
                    .await?;
                Ok(CompanionStatus::Updated)
            }
            None => {
                let parents = [self.folder_id.as_str()];
                let pdf_name = record_file_name(&record.name, &record.updated_at, "pdf");
                let pdf_file = self.drive.create(&pdf_name, PDF_MIME, &parents, &bytes).await?;
                record.pdf_file_id = Some(pdf_file.id);
                self.drive
                    .update(id, None, Some(document_json(record)?.as_bytes()), JSON_MIME)
                    .await?;
                Ok(CompanionStatus::Created)
            }
        }
    }

    /// Fallback companion lookup by name for legacy documents. First match
    /// in `modifiedTime desc` order wins.
    async fn find_companion(&self, name: &str) -> Option<String> {
        let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
        let filter = format!(
            "mimeType='application/pdf' and name contains '{}'",
            escaped
        );
        match self.drive.list(Some(&self.folder_id), Some(&filter), None).await {
            Ok(files) => files.into_iter().next().map(|f| f.id),
            Err(e) => {
                tracing::warn!(error = %e, "Companion lookup failed");
                None
            }
        }
    }
}

/// The document as written to Drive: listing-attached fields stripped.
fn document_json(record: &TemplateRecord) -> Result<String, AppError> {
    let stored = TemplateRecord {
        file_id: None,
        file_name: None,
        ..record.clone()
    };
    serde_json::to_string_pretty(&stored)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("encode template: {}", e)))
}

/// `{name}_{timestamp}.{ext}` with filesystem-hostile characters replaced.
fn record_file_name(name: &str, timestamp: &str, extension: &str) -> String {
    let stamp = timestamp.replace(':', "-").replace('.', "-");
    format!("{}_{}.{}", name, stamp, extension)
}

/// Bump the minor component of a `v?MAJOR.MINOR` version. Anything that
/// does not match that shape resets to `1.0`.
fn bump_version(version: &str) -> String {
    fn component(s: &str) -> Option<u32> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse().ok()
    }

    let (prefix, rest) = match version.strip_prefix('v') {
        Some(rest) => ("v", rest),
        None => ("", version),
    };
    let Some((major, minor)) = rest.split_once('.') else {
        return "1.0".to_string();
    };
    match (component(major), component(minor)) {
        (Some(major), Some(minor)) => format!("{}{}.{}", prefix, major, minor + 1),
        _ => "1.0".to_string(),
    }
}
