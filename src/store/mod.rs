//! Local persistent state (key-value store plus fixed keys).

pub mod kv;
pub mod preferences;

pub use kv::KvStore;
pub use preferences::Preferences;

/// Persisted keys as constants.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "gdrive_access_token";
    pub const TOKEN_EXPIRY: &str = "gdrive_token_expiry";
    pub const USER_PROFILE: &str = "gdrive_user_profile";
    pub const LAST_FOLDER: &str = "last_folder_id";
    pub const ACTIVE_VIEW: &str = "active_view";
    pub const TEMPLATE_DRAFT: &str = "template_draft";
    /// The full site registry, newest first
    pub const SITES: &str = "sites";
}
