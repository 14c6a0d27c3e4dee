// SPDX-License-Identifier: MIT
// Copyright 2026 Drivedesk Developers

mod common;

use common::test_context;
use drivedesk::error::AppError;
use drivedesk::models::{Question, TemplateCreate, TemplateUpdate};
use drivedesk::services::CompanionStatus;

fn question(text: &str) -> Question {
    Question {
        text: text.to_string(),
        question_type: "text".to_string(),
        required: false,
        helper_text: None,
        options: Vec::new(),
    }
}

fn template_doc(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "category": "General",
        "description": "",
        "questions": [{ "text": "Q1", "type": "text", "required": false }],
        "status": "Active",
        "version": "1.0",
        "createdAt": "2026-01-01T00:00:00+00:00",
        "updatedAt": "2026-01-01T00:00:00+00:00",
    })
}

#[tokio::test]
async fn test_list_skips_malformed_documents() {
    let ctx = test_context().await;
    let folder = ctx.state.config.templates_folder_id.clone();

    ctx.drive.seed(
        "A.json",
        "application/json",
        &folder,
        serde_json::to_vec(&template_doc("A")).unwrap(),
    );
    ctx.drive.seed(
        "B.json",
        "application/json",
        &folder,
        serde_json::to_vec(&template_doc("B")).unwrap(),
    );
    ctx.drive
        .seed("C.json", "application/json", &folder, b"{not json".to_vec());

    let records = ctx.state.templates.list().await.unwrap();
    assert_eq!(records.len(), 2);
    // newest first
    assert_eq!(records[0].name, "B");
    assert_eq!(records[1].name, "A");
}

#[tokio::test]
async fn test_get_surfaces_parse_failure() {
    let ctx = test_context().await;
    let folder = ctx.state.config.templates_folder_id.clone();
    let id = ctx
        .drive
        .seed("bad.json", "application/json", &folder, b"oops".to_vec());

    let err = ctx.state.templates.get(&id).await.unwrap_err();
    assert!(matches!(err, AppError::Parse(_)));
}

#[tokio::test]
async fn test_get_is_idempotent() {
    let ctx = test_context().await;
    let folder = ctx.state.config.templates_folder_id.clone();
    let id = ctx.drive.seed(
        "Walk.json",
        "application/json",
        &folder,
        serde_json::to_vec(&template_doc("Walk")).unwrap(),
    );

    let first = serde_json::to_value(ctx.state.templates.get(&id).await.unwrap()).unwrap();
    let second = serde_json::to_value(ctx.state.templates.get(&id).await.unwrap()).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_get_falls_back_to_companion_name_search() {
    let ctx = test_context().await;
    let folder = ctx.state.config.templates_folder_id.clone();

    let pdf_id = ctx.drive.seed(
        "Walk_2026.pdf",
        "application/pdf",
        &folder,
        b"%PDF-1.4".to_vec(),
    );
    // legacy document: no pdfFileId field
    let id = ctx.drive.seed(
        "Walk_2026.json",
        "application/json",
        &folder,
        serde_json::to_vec(&template_doc("Walk")).unwrap(),
    );

    let record = ctx.state.templates.get(&id).await.unwrap();
    assert_eq!(record.pdf_file_id.as_deref(), Some(pdf_id.as_str()));
}

#[tokio::test]
async fn test_create_requires_name_and_a_nonblank_question() {
    let ctx = test_context().await;

    let err = ctx
        .state
        .templates
        .create(TemplateCreate {
            name: "   ".to_string(),
            category: None,
            description: None,
            questions: vec![question("Q")],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // only blank questions is as bad as none at all
    let err = ctx
        .state
        .templates
        .create(TemplateCreate {
            name: "Empty".to_string(),
            category: None,
            description: None,
            questions: vec![question("   "), question("")],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_create_roundtrip_and_blank_question_filter() {
    require_fonts!();
    let ctx = test_context().await;

    let created = ctx
        .state
        .templates
        .create(TemplateCreate {
            name: "Site Walk".to_string(),
            category: Some("Safety".to_string()),
            description: Some("Quarterly walkthrough".to_string()),
            questions: vec![question("  "), question("Is the gate locked?")],
        })
        .await
        .unwrap();

    assert_eq!(created.version, "1.0");
    assert_eq!(created.questions.len(), 1);
    assert_eq!(created.questions[0].text, "Is the gate locked?");
    let file_id = created.file_id.clone().unwrap();
    let pdf_id = created.pdf_file_id.clone().unwrap();
    assert!(ctx.drive.files.contains_key(&pdf_id));

    // everything except service-added fields round-trips unchanged
    let fetched = ctx.state.templates.get(&file_id).await.unwrap();
    assert_eq!(fetched.name, created.name);
    assert_eq!(fetched.category, created.category);
    assert_eq!(fetched.description, created.description);
    assert_eq!(fetched.questions, created.questions);
    assert_eq!(fetched.status, created.status);
    assert_eq!(fetched.version, created.version);
    assert_eq!(fetched.created_at, created.created_at);
    assert_eq!(fetched.updated_at, created.updated_at);
    assert_eq!(fetched.pdf_file_id, created.pdf_file_id);
}

#[tokio::test]
async fn test_update_bumps_version_and_timestamp() {
    require_fonts!();
    let ctx = test_context().await;

    let created = ctx
        .state
        .templates
        .create(TemplateCreate {
            name: "Audit".to_string(),
            category: None,
            description: None,
            questions: vec![question("Extinguishers charged?")],
        })
        .await
        .unwrap();
    let file_id = created.file_id.clone().unwrap();

    let outcome = ctx
        .state
        .templates
        .update(
            &file_id,
            TemplateUpdate {
                description: Some("Now with notes".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.template.version, "1.1");
    assert_eq!(outcome.template.description, "Now with notes");
    // untouched fields survive the merge
    assert_eq!(outcome.template.name, "Audit");
    assert_eq!(outcome.pdf_status, CompanionStatus::Updated);

    let before = chrono::DateTime::parse_from_rfc3339(&created.updated_at).unwrap();
    let after = chrono::DateTime::parse_from_rfc3339(&outcome.template.updated_at).unwrap();
    assert!(after >= before);

    // a second update keeps climbing
    let outcome = ctx
        .state
        .templates
        .update(&file_id, TemplateUpdate::default())
        .await
        .unwrap();
    assert_eq!(outcome.template.version, "1.2");
}

#[tokio::test]
async fn test_update_creates_missing_companion() {
    require_fonts!();
    let ctx = test_context().await;
    let folder = ctx.state.config.templates_folder_id.clone();

    // legacy document with no companion anywhere
    let id = ctx.drive.seed(
        "Legacy.json",
        "application/json",
        &folder,
        serde_json::to_vec(&template_doc("Legacy")).unwrap(),
    );

    let outcome = ctx
        .state
        .templates
        .update(&id, TemplateUpdate::default())
        .await
        .unwrap();

    assert_eq!(outcome.pdf_status, CompanionStatus::Created);
    let pdf_id = outcome.template.pdf_file_id.clone().unwrap();
    assert!(ctx.drive.files.contains_key(&pdf_id));

    // the stored document now carries the companion id
    let fetched = ctx.state.templates.get(&id).await.unwrap();
    assert_eq!(fetched.pdf_file_id.as_deref(), Some(pdf_id.as_str()));
}

#[tokio::test]
async fn test_delete_removes_json_and_companion() {
    let ctx = test_context().await;
    let folder = ctx.state.config.templates_folder_id.clone();

    let pdf_id = ctx.drive.seed(
        "Walk_1.pdf",
        "application/pdf",
        &folder,
        b"%PDF-1.4".to_vec(),
    );
    let mut doc = template_doc("Walk");
    doc["pdfFileId"] = serde_json::json!(pdf_id);
    let json_id = ctx.drive.seed(
        "Walk_1.json",
        "application/json",
        &folder,
        serde_json::to_vec(&doc).unwrap(),
    );

    ctx.state.templates.delete(&json_id).await.unwrap();

    let deleted = ctx.drive.deleted.lock().unwrap().clone();
    assert!(deleted.contains(&pdf_id));
    assert!(deleted.contains(&json_id));
    assert!(!ctx.drive.files.contains_key(&json_id));
    assert!(!ctx.drive.files.contains_key(&pdf_id));
}

#[tokio::test]
async fn test_operations_require_credentials() {
    let ctx = test_context().await;
    ctx.state.credentials.clear();

    let err = ctx.state.templates.list().await.unwrap_err();
    assert!(matches!(err, AppError::AuthRequired));
}
