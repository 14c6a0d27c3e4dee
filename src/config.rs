//! Application configuration loaded from environment variables.
//!
//! Endpoint bases are configurable so tests can point the gateway, the
//! identity lookup, and the QR client at local fakes.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Google OAuth client ID (public)
    pub google_client_id: String,
    /// Frontend URL: OAuth redirect target and allowed CORS origin
    pub frontend_url: String,
    /// Server port
    pub port: u16,

    /// Drive folder holding template JSON files and their PDF companions
    pub templates_folder_id: String,
    /// Drive folder holding user JSON files
    pub users_folder_id: String,

    /// Drive REST base (metadata calls)
    pub drive_api_base: String,
    /// Drive upload base (multipart create, media content updates)
    pub drive_upload_base: String,
    /// OpenID Connect userinfo endpoint
    pub identity_endpoint: String,
    /// Provider authorization endpoint for the implicit-grant redirect
    pub oauth_auth_endpoint: String,
    /// Base URL of the external QR-generation service
    pub qr_api_base: String,

    /// HMAC key for signing the OAuth state parameter
    pub oauth_state_key: Vec<u8>,

    /// Directory for the local state file (token, preferences, sites)
    pub data_dir: String,
    /// Directory holding the TTF font family for PDF rendering
    pub fonts_dir: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            google_client_id: "test_client_id".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            port: 8080,
            templates_folder_id: "templates-folder".to_string(),
            users_folder_id: "users-folder".to_string(),
            drive_api_base: "https://www.googleapis.com/drive/v3".to_string(),
            drive_upload_base: "https://www.googleapis.com/upload/drive/v3".to_string(),
            identity_endpoint: "https://openidconnect.googleapis.com/v1/userinfo".to_string(),
            oauth_auth_endpoint: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            qr_api_base: "http://localhost:5000/api".to_string(),
            oauth_state_key: b"test_state_key_32_bytes_minimum!".to_vec(),
            data_dir: "./data".to_string(),
            fonts_dir: "./fonts".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            google_client_id: env::var("GOOGLE_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_ID"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),

            templates_folder_id: env::var("TEMPLATES_FOLDER_ID")
                .map_err(|_| ConfigError::Missing("TEMPLATES_FOLDER_ID"))?,
            users_folder_id: env::var("USERS_FOLDER_ID")
                .map_err(|_| ConfigError::Missing("USERS_FOLDER_ID"))?,

            drive_api_base: env::var("DRIVE_API_BASE")
                .unwrap_or_else(|_| "https://www.googleapis.com/drive/v3".to_string()),
            drive_upload_base: env::var("DRIVE_UPLOAD_BASE")
                .unwrap_or_else(|_| "https://www.googleapis.com/upload/drive/v3".to_string()),
            identity_endpoint: env::var("IDENTITY_ENDPOINT")
                .unwrap_or_else(|_| "https://openidconnect.googleapis.com/v1/userinfo".to_string()),
            oauth_auth_endpoint: env::var("OAUTH_AUTH_ENDPOINT")
                .unwrap_or_else(|_| "https://accounts.google.com/o/oauth2/v2/auth".to_string()),
            qr_api_base: env::var("QR_API_BASE")
                .unwrap_or_else(|_| "http://localhost:5000/api".to_string()),

            oauth_state_key: env::var("OAUTH_STATE_KEY")
                .map_err(|_| ConfigError::Missing("OAUTH_STATE_KEY"))?
                .into_bytes(),

            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            fonts_dir: env::var("FONTS_DIR").unwrap_or_else(|_| "./fonts".to_string()),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
