// SPDX-License-Identifier: MIT
// Copyright 2026 Drivedesk Developers

//! Domain records stored in Drive folders or the local registry.

pub mod site;
pub mod template;
pub mod user;

pub use site::{SiteCreate, SiteRecord, SiteUpdate};
pub use template::{Question, TemplateCreate, TemplateRecord, TemplateUpdate};
pub use user::{UserCreate, UserRecord, UserUpdate};
