// SPDX-License-Identifier: MIT
// Copyright 2026 Drivedesk Developers

//! Credential storage and the OAuth implicit-grant helpers.

pub mod credentials;
pub mod oauth;

pub use credentials::{AuthState, CredentialStore, Profile};
pub use oauth::{authorization_url, consume_redirect_fragment, verify_state, FragmentToken};
