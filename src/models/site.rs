//! Site records, persisted in the local registry rather than Drive.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteRecord {
    /// Derived from the name plus a millisecond suffix
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(default = "default_folder_type")]
    pub folder_type: String,
    pub folder_link: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    /// Email of the signed-in creator, when the profile was cached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

fn default_folder_type() -> String {
    "GoogleDrive".to_string()
}

/// Payload for creating a site.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteCreate {
    pub name: String,
    pub location: String,
    pub folder_link: String,
    #[serde(default)]
    pub folder_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Street address forwarded to the QR service; defaults to `location`
    #[serde(default)]
    pub address: Option<String>,
}

/// Partial update; provided fields replace the stored ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub folder_link: Option<String>,
    #[serde(default)]
    pub folder_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}
