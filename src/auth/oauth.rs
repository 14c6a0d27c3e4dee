// SPDX-License-Identifier: MIT
// Copyright 2026 Drivedesk Developers

//! OAuth implicit-grant helpers.
//!
//! Builds the provider authorization URL (`response_type=token`) with an
//! HMAC-signed `state` parameter, and consumes the token fragment the
//! provider appends to the redirect URL. Protocol semantics beyond that
//! are the provider's business.

use crate::config::Config;
use crate::error::AppError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

/// Scopes requested from the provider: Drive plus basic identity.
const SCOPES: &str = "https://www.googleapis.com/auth/drive \
                      https://www.googleapis.com/auth/userinfo.profile \
                      https://www.googleapis.com/auth/userinfo.email";

/// Token material recovered from the redirect URL fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentToken {
    pub access_token: String,
    pub expires_in: i64,
    pub state: Option<String>,
}

/// Build the full authorization redirect URL for the implicit grant.
pub fn authorization_url(config: &Config) -> Result<String, AppError> {
    let state = signed_state(&config.frontend_url, &config.oauth_state_key)?;

    Ok(format!(
        "{}?client_id={}&redirect_uri={}&response_type=token&scope={}&include_granted_scopes=true&prompt=consent&state={}",
        config.oauth_auth_endpoint,
        config.google_client_id,
        urlencoding::encode(&config.frontend_url),
        urlencoding::encode(SCOPES),
        state,
    ))
}

/// Sign `frontend_url|timestamp_hex` and base64-encode the result for the
/// `state` parameter.
fn signed_state(frontend_url: &str, secret: &[u8]) -> Result<String, AppError> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis();

    let payload = format!("{}|{:x}", frontend_url, timestamp);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    let signed = format!("{}|{}", payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
}

/// Verify the HMAC signature and recover the frontend URL from a `state`
/// parameter. Returns `None` on any mismatch or malformation.
pub fn verify_state(state: &str, secret: &[u8]) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Format is "frontend_url|timestamp_hex|signature_hex"
    let parts: Vec<&str> = state_str.splitn(3, '|').collect();
    if parts.len() != 3 {
        return None;
    }

    let frontend_url = parts[0];
    let timestamp_hex = parts[1];
    let signature_hex = parts[2];

    let payload = format!("{}|{}", frontend_url, timestamp_hex);

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());
    let expected_signature = hex::encode(mac.finalize().into_bytes());

    if signature_hex != expected_signature {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    Some(frontend_url.to_string())
}

/// Pull `access_token` / `expires_in` / `state` out of a redirect URL
/// fragment. Returns the token material and the URL with the fragment
/// stripped, so the token can be consumed exactly once.
pub fn consume_redirect_fragment(url: &str) -> Option<(FragmentToken, String)> {
    let (base, fragment) = url.split_once('#')?;

    let mut access_token = None;
    let mut expires_in = None;
    let mut state = None;

    for pair in fragment.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        match key {
            "access_token" => {
                access_token = urlencoding::decode(value).ok().map(|v| v.into_owned());
            }
            "expires_in" => expires_in = value.parse().ok(),
            "state" => state = urlencoding::decode(value).ok().map(|v| v.into_owned()),
            _ => {}
        }
    }

    Some((
        FragmentToken {
            access_token: access_token?,
            expires_in: expires_in.unwrap_or(3600),
            state,
        },
        base.to_string(),
    ))
}
