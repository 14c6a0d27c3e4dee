// SPDX-License-Identifier: MIT
// Copyright 2026 Drivedesk Developers

//! Services module - the data-access layer.

pub mod drive;
pub mod qr;
pub mod sites;
pub mod templates;
pub mod users;

pub use drive::{DriveClient, DriveFile};
pub use qr::QrClient;
pub use sites::SiteRegistry;
pub use templates::{CompanionStatus, TemplateService, TemplateUpdateOutcome};
pub use users::UserService;
