// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Convex adapter.
//!
//! Identity comes from an externally issued token (the deployment is wired
//! to a hosted identity provider), so this adapter cannot sign anyone in by
//! password. Profiles go through the deployment's HTTP mutation endpoint:
//! `users:store` creates or reconciles the row keyed by the token
//! identifier, `users:updateProfile` writes the form fields.
//!
//! `users:store` answers with the row id only, so university and stream
//! are unknown (`None`) until the form has been saved from this process.

use super::{BackendError, BackendResult, IdentityProvider, ProfileStore, SignUp};
use crate::models::identity::Identity;
use crate::models::profile::{ProfileUpdate, UserProfile, NOT_SET};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Mutex;

const STORE_USER: &str = "users:store";
const UPDATE_PROFILE: &str = "users:updateProfile";

/// Deployment URL plus the identity the issued token belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvexConfig {
    pub url: String,
    pub auth_token: Option<String>,
    pub name: String,
    pub email: String,
    pub picture_url: Option<String>,
}

impl ConvexConfig {
    pub fn is_complete(&self) -> bool {
        !self.url.trim().is_empty()
    }

    fn identity(&self) -> Option<Identity> {
        let token = self.auth_token.as_deref().filter(|t| !t.trim().is_empty())?;
        let user_id = if self.email.is_empty() {
            token.chars().take(16).collect()
        } else {
            self.email.clone()
        };
        Some(Identity {
            user_id,
            name: self.name.clone(),
            email: self.email.clone(),
            avatar_url: self.picture_url.clone(),
        })
    }
}

/// Envelope of every function call answer.
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum CallResponse {
    Success {
        #[serde(default)]
        value: Value,
    },
    Error {
        #[serde(rename = "errorMessage")]
        error_message: String,
    },
}

fn call_body(path: &str, args: Value) -> Value {
    json!({ "path": path, "args": args, "format": "json" })
}

fn parse_call(body: &str) -> BackendResult<Value> {
    let response: CallResponse =
        serde_json::from_str(body).map_err(|e| BackendError::Decode(e.to_string()))?;
    match response {
        CallResponse::Success { value } => Ok(value),
        CallResponse::Error { error_message } if error_message.contains("without authentication") => {
            Err(BackendError::NotAuthenticated)
        }
        CallResponse::Error { error_message } => Err(BackendError::Remote(error_message)),
    }
}

fn stored_profile(identity: &Identity, id: &str, saved: Option<UserProfile>) -> UserProfile {
    let mut profile = UserProfile::from_identity(identity);
    profile.id = id.to_string();
    if let Some(saved) = saved {
        profile.university = saved.university;
        profile.stream = saved.stream;
        profile.age = saved.age;
        profile.gender = saved.gender;
    }
    profile
}

pub struct ConvexBackend {
    http: Client,
    config: ConvexConfig,
    signed_out: Mutex<bool>,
    /// Last profile written by this process, merged into `users:store` answers.
    saved: Mutex<Option<UserProfile>>,
}

impl ConvexBackend {
    pub fn new(config: ConvexConfig) -> Self {
        Self {
            http: Client::new(),
            config,
            signed_out: Mutex::new(false),
            saved: Mutex::new(None),
        }
    }

    fn is_signed_out(&self) -> bool {
        self.signed_out.lock().map(|s| *s).unwrap_or(true)
    }

    fn mutation(&self, path: &str, args: Value) -> BackendResult<Value> {
        let token = self
            .config
            .auth_token
            .as_deref()
            .filter(|_| !self.is_signed_out())
            .ok_or(BackendError::NotAuthenticated)?;
        let url = format!("{}/api/mutation", self.config.url.trim_end_matches('/'));
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&call_body(path, args))
            .send()?;
        let status = response.status();
        let body = response.text()?;
        // Function errors come back as 200s or 4xx with the same envelope.
        match parse_call(&body) {
            Err(BackendError::Decode(_)) if !status.is_success() => Err(super::status_error(status, &body)),
            other => other,
        }
    }
}

impl IdentityProvider for ConvexBackend {
    fn restore_session(&self) -> BackendResult<Option<Identity>> {
        if self.is_signed_out() {
            return Ok(None);
        }
        Ok(self.config.identity())
    }

    fn sign_in(&self, _email: &str, _password: &str) -> BackendResult<Identity> {
        Err(BackendError::Unsupported("password sign-in"))
    }

    fn sign_up(&self, _email: &str, _password: &str, _name: Option<&str>) -> BackendResult<SignUp> {
        Err(BackendError::Unsupported("password sign-up"))
    }

    fn sign_out(&self) -> BackendResult<()> {
        if let Ok(mut flag) = self.signed_out.lock() {
            *flag = true;
        }
        Ok(())
    }
}

impl ProfileStore for ConvexBackend {
    fn ensure_profile(&self, identity: &Identity) -> BackendResult<UserProfile> {
        let value = self.mutation(STORE_USER, json!({}))?;
        let id = value
            .as_str()
            .ok_or_else(|| BackendError::Decode(format!("{STORE_USER} returned {value}")))?;

        let saved = self.saved.lock().ok().and_then(|s| s.clone());
        Ok(stored_profile(identity, id, saved))
    }

    fn save_profile(&self, identity: &Identity, update: &ProfileUpdate) -> BackendResult<UserProfile> {
        self.mutation(
            UPDATE_PROFILE,
            json!({
                "name": update.name.trim(),
                "university": update.university.trim(),
                "stream": update.stream.as_deref().unwrap_or(NOT_SET),
            }),
        )?;
        let mut profile = self.ensure_profile(identity)?;
        update.apply_to(&mut profile);
        if let Ok(mut saved) = self.saved.lock() {
            *saved = Some(profile.clone());
        }
        Ok(profile)
    }
}
