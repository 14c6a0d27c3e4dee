//! Template records stored as JSON files in the templates folder.

use serde::{Deserialize, Serialize};

/// One question on an inspection template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub text: String,
    /// Input kind: text, checkbox, radio, select, date, number
    #[serde(rename = "type", default = "default_question_type")]
    pub question_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helper_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

fn default_question_type() -> String {
    "text".to_string()
}

/// An inspection template as stored in its JSON file.
///
/// `file_id`/`file_name` are attached from the Drive listing when the
/// record is read back; they are never part of the stored document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    pub name: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<Question>,
    #[serde(default = "default_status")]
    pub status: String,
    /// Two-component version, minor bumped on every update
    #[serde(default)]
    pub version: String,
    pub created_at: String,
    pub updated_at: String,
    /// Drive id of the rendered PDF companion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_file_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

fn default_category() -> String {
    "General".to_string()
}

fn default_status() -> String {
    "Active".to_string()
}

/// Payload for creating a template.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCreate {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Partial update; provided fields replace the stored ones wholesale.
/// The version and timestamps are service-owned and not settable here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Option<Vec<Question>>,
    #[serde(default)]
    pub status: Option<String>,
}
