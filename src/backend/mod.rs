// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Identity and profile capabilities, with one adapter per hosted backend.
//!
//! The UI only ever talks to [`IdentityProvider`] and [`ProfileStore`].
//! All calls block and are made from background threads.

pub mod convex;
pub mod local;
pub mod supabase;

use crate::models::identity::Identity;
use crate::models::profile::{ProfileUpdate, UserProfile};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("{0}")]
    Remote(String),

    #[error("Not supported by this backend: {0}")]
    Unsupported(&'static str),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            BackendError::Decode(e.to_string())
        } else {
            BackendError::Network(e.to_string())
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Which hosted service the app talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process accounts and profiles, nothing leaves the machine.
    #[default]
    Local,
    Supabase,
    Convex,
}

impl BackendKind {
    pub fn label(self) -> &'static str {
        match self {
            BackendKind::Local => "Local",
            BackendKind::Supabase => "Supabase",
            BackendKind::Convex => "Convex",
        }
    }
}

/// Result of a sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUp {
    SignedIn(Identity),
    /// The provider wants the email address confirmed first.
    ConfirmationRequired,
}

/// Supplies the signed-in identity.
pub trait IdentityProvider: Send + Sync {
    /// Session that already exists when the app starts, if any.
    fn restore_session(&self) -> BackendResult<Option<Identity>>;

    fn sign_in(&self, email: &str, password: &str) -> BackendResult<Identity>;

    fn sign_up(&self, email: &str, password: &str, name: Option<&str>) -> BackendResult<SignUp>;

    fn sign_out(&self) -> BackendResult<()>;
}

/// Reads and writes the `users` row of the signed-in identity.
pub trait ProfileStore: Send + Sync {
    /// Create the row on first sign-in, or reconcile it with the identity.
    fn ensure_profile(&self, identity: &Identity) -> BackendResult<UserProfile>;

    /// Upsert the row from the profile form.
    fn save_profile(&self, identity: &Identity, update: &ProfileUpdate) -> BackendResult<UserProfile>;
}

/// The pair of capabilities the app is wired with.
#[derive(Clone)]
pub struct Backend {
    pub kind: BackendKind,
    pub identity: Arc<dyn IdentityProvider>,
    pub profiles: Arc<dyn ProfileStore>,
}

impl Backend {
    pub fn local() -> Self {
        let local = Arc::new(local::LocalBackend::default());
        Self {
            kind: BackendKind::Local,
            identity: local.clone(),
            profiles: local,
        }
    }

    /// Profile for `identity`, falling back to the provider's own metadata
    /// when the store cannot be reached.
    pub fn load_profile(&self, identity: &Identity) -> UserProfile {
        match self.profiles.ensure_profile(identity) {
            Ok(profile) => profile,
            Err(e) => {
                log::warn!("Profile fetch failed, using identity metadata: {}", e);
                UserProfile::from_identity(identity)
            }
        }
    }
}

/// Pull a human-readable message out of an error body, whichever of the
/// usual keys the service used.
pub(crate) fn error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            ["msg", "error_description", "message", "errorMessage", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(|m| m.as_str()))
        })
        .map(str::to_string)
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "Unknown error".to_string()
            } else {
                trimmed.to_string()
            }
        })
}

/// Map a non-success HTTP status and body to an error.
pub(crate) fn status_error(status: reqwest::StatusCode, body: &str) -> BackendError {
    let message = error_message(body);
    match status.as_u16() {
        401 | 403 => BackendError::Unauthorized(message),
        404 => BackendError::NotFound(message),
        _ => BackendError::Remote(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unreachable;

    impl ProfileStore for Unreachable {
        fn ensure_profile(&self, _: &Identity) -> BackendResult<UserProfile> {
            Err(BackendError::Network("connection refused".into()))
        }

        fn save_profile(&self, _: &Identity, _: &ProfileUpdate) -> BackendResult<UserProfile> {
            Err(BackendError::Network("connection refused".into()))
        }
    }

    #[test]
    fn test_profile_falls_back_to_identity() {
        let mut backend = Backend::local();
        backend.profiles = Arc::new(Unreachable);
        let identity = Identity {
            user_id: "u1".into(),
            name: "Sarah Lee".into(),
            email: "sarah@example.com".into(),
            avatar_url: None,
        };
        let profile = backend.load_profile(&identity);
        assert_eq!(profile.name, "Sarah Lee");
        assert_eq!(profile.university, None);
    }

    #[test]
    fn test_error_message_keys() {
        assert_eq!(error_message(r#"{"msg":"Invalid login credentials"}"#), "Invalid login credentials");
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Email not confirmed"}"#),
            "Email not confirmed"
        );
        assert_eq!(error_message("gateway timeout"), "gateway timeout");
        assert_eq!(error_message(""), "Unknown error");
    }

    #[test]
    fn test_status_mapping() {
        let e = status_error(reqwest::StatusCode::UNAUTHORIZED, r#"{"message":"JWT expired"}"#);
        assert_eq!(e, BackendError::Unauthorized("JWT expired".into()));
        let e = status_error(reqwest::StatusCode::BAD_REQUEST, r#"{"msg":"weak password"}"#);
        assert_eq!(e, BackendError::Remote("weak password".into()));
    }
}
