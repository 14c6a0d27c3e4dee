// SPDX-License-Identifier: MIT
// Copyright 2026 Drivedesk Developers

//! Drivedesk: an admin-portal backend that uses Google Drive as a
//! document store.
//!
//! Inspection templates and portal users live as JSON files in fixed
//! Drive folders; sites live in a local on-disk registry with a QR code
//! obtained from an external generator. Templates carry a rendered PDF
//! companion next to their JSON file.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod pdf;
pub mod routes;
pub mod services;
pub mod store;

use std::sync::Arc;

use auth::CredentialStore;
use config::Config;
use services::{DriveClient, QrClient, SiteRegistry, TemplateService, UserService};
use store::{KvStore, Preferences};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub kv: KvStore,
    pub credentials: Arc<CredentialStore>,
    pub preferences: Preferences,
    pub drive: DriveClient,
    pub templates: TemplateService,
    pub users: UserService,
    pub sites: SiteRegistry,
}

impl AppState {
    /// Wire all services over one KV store and one credential store.
    pub fn new(config: Config, kv: KvStore) -> Self {
        let credentials = Arc::new(CredentialStore::new(
            kv.clone(),
            config.identity_endpoint.clone(),
        ));
        let drive = DriveClient::new(&config, credentials.clone());
        let templates = TemplateService::new(&config, drive.clone());
        let users = UserService::new(&config, drive.clone());
        let qr = QrClient::new(config.qr_api_base.clone());
        let sites = SiteRegistry::new(kv.clone(), credentials.clone(), qr);
        let preferences = Preferences::new(kv.clone());

        Self {
            config,
            kv,
            credentials,
            preferences,
            drive,
            templates,
            users,
            sites,
        }
    }
}
