//! Small persisted UI preferences: last-used folder, active view, and
//! the in-progress template draft.

use crate::error::AppError;
use crate::store::{keys, KvStore};

#[derive(Clone)]
pub struct Preferences {
    kv: KvStore,
}

impl Preferences {
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    pub fn last_folder(&self) -> Option<String> {
        self.kv.get(keys::LAST_FOLDER)
    }

    pub fn set_last_folder(&self, folder_id: &str) -> Result<(), AppError> {
        self.kv.set(keys::LAST_FOLDER, &folder_id)
    }

    pub fn active_view(&self) -> Option<String> {
        self.kv.get(keys::ACTIVE_VIEW)
    }

    pub fn set_active_view(&self, view: &str) -> Result<(), AppError> {
        self.kv.set(keys::ACTIVE_VIEW, &view)
    }

    pub fn template_draft(&self) -> Option<serde_json::Value> {
        self.kv.get(keys::TEMPLATE_DRAFT)
    }

    pub fn set_template_draft(&self, draft: &serde_json::Value) -> Result<(), AppError> {
        self.kv.set(keys::TEMPLATE_DRAFT, draft)
    }

    pub fn clear_template_draft(&self) -> Result<(), AppError> {
        self.kv.remove(keys::TEMPLATE_DRAFT)
    }
}
