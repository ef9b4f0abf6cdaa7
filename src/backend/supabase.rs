// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Supabase adapter: GoTrue auth endpoints for identity and the PostgREST
//! `users` table for profiles.
//!
//! The `users` row id equals the auth user id. The row is created lazily
//! on first sign-in and upserted from the profile form. The table has no
//! age or gender columns, so those fields only live in the session.
//!
//! The refresh token is kept in a small JSON file so a later run can trade
//! it for a fresh session. Calls that come back 401 refresh once and retry.

use super::{
    status_error, BackendError, BackendResult, IdentityProvider, ProfileStore, SignUp,
};
use crate::models::identity::Identity;
use crate::models::profile::{ProfileUpdate, UserProfile};
use anyhow::Context;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const DEFAULT_SESSION_FILE: &str = "baithak-session.json";

/// Project URL and public anon key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    /// Where the refresh token is kept between runs. `None` keeps the
    /// session in memory only.
    pub session_file: Option<PathBuf>,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            session_file: Some(PathBuf::from(DEFAULT_SESSION_FILE)),
        }
    }
}

impl SupabaseConfig {
    pub fn is_complete(&self) -> bool {
        !self.url.trim().is_empty() && !self.anon_key.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub(crate) struct UserMetadata {
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

impl AuthUser {
    fn identity(&self) -> Identity {
        let meta = &self.user_metadata;
        Identity {
            user_id: self.id.clone(),
            name: meta
                .full_name
                .clone()
                .or_else(|| meta.name.clone())
                .unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            avatar_url: meta.avatar_url.clone().or_else(|| meta.picture.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct AuthSession {
    access_token: String,
    #[serde(default)]
    refresh_token: String,
    user: AuthUser,
}

/// On-disk form of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredSession {
    refresh_token: String,
}

fn read_stored(path: &Path) -> anyhow::Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file {}", path.display()))?;
    let stored: StoredSession = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse session file {}", path.display()))?;
    Ok(Some(stored.refresh_token).filter(|t| !t.is_empty()))
}

fn write_stored(path: &Path, refresh_token: &str) -> anyhow::Result<()> {
    let stored = StoredSession {
        refresh_token: refresh_token.to_string(),
    };
    let text = serde_json::to_string(&stored)?;
    std::fs::write(path, text)
        .with_context(|| format!("Failed to write session file {}", path.display()))
}

fn remove_stored(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to remove session file {}", path.display()))?;
    }
    Ok(())
}

fn refresh_body(refresh_token: &str) -> Value {
    json!({ "refresh_token": refresh_token })
}

/// Sign-up answers with a session when confirmation is off, or with the
/// bare user when an email must be confirmed first.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum SignUpResponse {
    Session(AuthSession),
    User(AuthUser),
}

/// A row of the `users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct UserRow {
    id: String,
    email: String,
    name: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    university: Option<String>,
    #[serde(default)]
    stream: Option<String>,
}

impl UserRow {
    fn for_identity(identity: &Identity) -> Self {
        Self {
            id: identity.user_id.clone(),
            email: identity.email.clone(),
            name: identity.display_name(),
            image: identity.avatar_url.clone(),
            university: None,
            stream: None,
        }
    }

    fn into_profile(self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email,
            name: self.name,
            image: self.image,
            university: self.university,
            stream: self.stream,
            age: None,
            gender: None,
        }
    }
}

pub struct SupabaseBackend {
    http: Client,
    config: SupabaseConfig,
    session: Mutex<Option<AuthSession>>,
}

impl SupabaseBackend {
    pub fn new(config: SupabaseConfig) -> Self {
        Self {
            http: Client::new(),
            config,
            session: Mutex::new(None),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    fn access_token(&self) -> BackendResult<String> {
        self.session
            .lock()
            .ok()
            .and_then(|s| s.as_ref().map(|s| s.access_token.clone()))
            .ok_or(BackendError::NotAuthenticated)
    }

    fn store_session(&self, session: Option<AuthSession>) {
        self.persist(session.as_ref().map(|s| s.refresh_token.as_str()));
        if let Ok(mut slot) = self.session.lock() {
            *slot = session;
        }
    }

    fn persist(&self, refresh_token: Option<&str>) {
        let Some(path) = self.config.session_file.as_deref() else {
            return;
        };
        let result = match refresh_token.filter(|t| !t.is_empty()) {
            Some(token) => write_stored(path, token),
            None => remove_stored(path),
        };
        if let Err(e) = result {
            log::warn!("{:#}", e);
        }
    }

    /// The in-memory refresh token, else the one saved by an earlier run.
    fn refresh_token(&self) -> Option<String> {
        let in_memory = self
            .session
            .lock()
            .ok()
            .and_then(|s| s.as_ref().map(|s| s.refresh_token.clone()))
            .filter(|t| !t.is_empty());
        in_memory.or_else(|| {
            let path = self.config.session_file.as_deref()?;
            read_stored(path).unwrap_or_else(|e| {
                log::warn!("{:#}", e);
                None
            })
        })
    }

    fn refresh(&self, refresh_token: &str) -> BackendResult<AuthSession> {
        let request = self
            .http
            .post(self.endpoint("/auth/v1/token"))
            .query(&[("grant_type", "refresh_token")])
            .json(&refresh_body(refresh_token));
        let session: AuthSession = checked(self.authorized(request, None).send()?)?.json()?;
        log::debug!("Refreshed session for {}", session.user.id);
        self.store_session(Some(session.clone()));
        Ok(session)
    }

    /// Trade the refresh token for a new session. `None` when there is no
    /// token or the provider no longer accepts it.
    fn renew(&self) -> BackendResult<Option<AuthSession>> {
        let Some(token) = self.refresh_token() else {
            return Ok(None);
        };
        match self.refresh(&token) {
            Ok(session) => Ok(Some(session)),
            Err(BackendError::Unauthorized(message)) | Err(BackendError::Remote(message)) => {
                log::info!("Stored session rejected: {}", message);
                self.store_session(None);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Attach the anon key, and the user's token when there is one.
    fn authorized(&self, request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        let bearer = token.unwrap_or(&self.config.anon_key);
        request
            .header("apikey", &self.config.anon_key)
            .bearer_auth(bearer)
    }

    fn rest(&self, request: RequestBuilder) -> BackendResult<Vec<UserRow>> {
        let token = self.access_token()?;
        let retry = request.try_clone();
        match checked(self.authorized(request, Some(&token)).send()?) {
            Ok(response) => Ok(response.json()?),
            Err(BackendError::Unauthorized(message)) => {
                let (Some(retry), Some(session)) = (retry, self.renew()?) else {
                    return Err(BackendError::Unauthorized(message));
                };
                log::debug!("Retrying with a refreshed token");
                let response = self.authorized(retry, Some(&session.access_token)).send()?;
                Ok(checked(response)?.json()?)
            }
            Err(e) => Err(e),
        }
    }

    fn select_user(&self, id: &str) -> BackendResult<Option<UserRow>> {
        let request = self
            .http
            .get(self.endpoint("/rest/v1/users"))
            .query(&[("id", format!("eq.{id}")), ("select", "*".to_string())]);
        Ok(self.rest(request)?.into_iter().next())
    }

    fn write_user(&self, row: &UserRow, upsert: bool) -> BackendResult<UserRow> {
        let prefer = if upsert {
            "resolution=merge-duplicates,return=representation"
        } else {
            "return=representation"
        };
        let request = self
            .http
            .post(self.endpoint("/rest/v1/users"))
            .header("Prefer", prefer)
            .json(row);
        self.rest(request)?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::Decode("users write returned no row".into()))
    }
}

fn checked(response: Response) -> BackendResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(status_error(status, &body))
}

impl IdentityProvider for SupabaseBackend {
    fn restore_session(&self) -> BackendResult<Option<Identity>> {
        if let Ok(token) = self.access_token() {
            let request = self.http.get(self.endpoint("/auth/v1/user"));
            match checked(self.authorized(request, Some(&token)).send()?) {
                Ok(response) => return Ok(Some(response.json::<AuthUser>()?.identity())),
                Err(BackendError::Unauthorized(_)) => {}
                Err(e) => return Err(e),
            }
        }
        let identity = self.renew()?.map(|session| session.user.identity());
        if let Some(identity) = &identity {
            log::info!("Restored session for {}", identity.user_id);
        }
        Ok(identity)
    }

    fn sign_in(&self, email: &str, password: &str) -> BackendResult<Identity> {
        let request = self
            .http
            .post(self.endpoint("/auth/v1/token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email.trim(), "password": password }));
        let session: AuthSession = checked(self.authorized(request, None).send()?)?.json()?;
        let identity = session.user.identity();
        log::info!("Signed in as {}", identity.user_id);
        self.store_session(Some(session));
        Ok(identity)
    }

    fn sign_up(&self, email: &str, password: &str, name: Option<&str>) -> BackendResult<SignUp> {
        let request = self
            .http
            .post(self.endpoint("/auth/v1/signup"))
            .json(&json!({
                "email": email.trim(),
                "password": password,
                "data": { "full_name": name },
            }));
        let response: SignUpResponse = checked(self.authorized(request, None).send()?)?.json()?;
        Ok(match response {
            SignUpResponse::Session(session) => {
                let identity = session.user.identity();
                self.store_session(Some(session));
                SignUp::SignedIn(identity)
            }
            SignUpResponse::User(_) => SignUp::ConfirmationRequired,
        })
    }

    fn sign_out(&self) -> BackendResult<()> {
        let token = self.access_token();
        self.store_session(None);
        if let Ok(token) = token {
            let request = self.http.post(self.endpoint("/auth/v1/logout"));
            checked(self.authorized(request, Some(&token)).send()?)?;
        }
        Ok(())
    }
}

impl ProfileStore for SupabaseBackend {
    fn ensure_profile(&self, identity: &Identity) -> BackendResult<UserProfile> {
        if let Some(row) = self.select_user(&identity.user_id)? {
            return Ok(row.into_profile());
        }
        log::info!("Creating profile row for {}", identity.user_id);
        let row = self.write_user(&UserRow::for_identity(identity), false)?;
        Ok(row.into_profile())
    }

    fn save_profile(&self, identity: &Identity, update: &ProfileUpdate) -> BackendResult<UserProfile> {
        let mut profile = UserProfile::from_identity(identity);
        update.apply_to(&mut profile);
        let row = UserRow {
            id: identity.user_id.clone(),
            email: identity.email.clone(),
            name: profile.name.clone(),
            image: identity.avatar_url.clone(),
            university: profile.university.clone(),
            stream: profile.stream.clone(),
        };
        let mut saved = self.write_user(&row, true)?.into_profile();
        saved.age = update.age;
        saved.gender = profile.gender;
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> SupabaseConfig {
        SupabaseConfig {
            url: url.into(),
            anon_key: "anon".into(),
            session_file: None,
        }
    }

    fn session(refresh_token: &str) -> AuthSession {
        serde_json::from_value(json!({
            "access_token": "a1",
            "refresh_token": refresh_token,
            "user": { "id": "u1", "email": "a@b.c" },
        }))
        .unwrap()
    }

    #[test]
    fn test_identity_prefers_full_name_and_avatar() {
        let user: AuthUser = serde_json::from_str(
            r#"{"id":"9f1c","email":"arjun@example.com",
                "user_metadata":{"full_name":"Arjun Sharma","name":"arjun","picture":"p.png","avatar_url":"a.png"}}"#,
        )
        .unwrap();
        let identity = user.identity();
        assert_eq!(identity.user_id, "9f1c");
        assert_eq!(identity.name, "Arjun Sharma");
        assert_eq!(identity.avatar_url.as_deref(), Some("a.png"));
    }

    #[test]
    fn test_identity_without_metadata() {
        let user: AuthUser = serde_json::from_str(r#"{"id":"x","email":"lee@example.com"}"#).unwrap();
        let identity = user.identity();
        assert_eq!(identity.display_name(), "lee");
        assert_eq!(identity.avatar_url, None);
    }

    #[test]
    fn test_sign_up_response_shapes() {
        let session: SignUpResponse = serde_json::from_str(
            r#"{"access_token":"t","refresh_token":"r","token_type":"bearer","user":{"id":"1","email":"a@b.c"}}"#,
        )
        .unwrap();
        assert!(matches!(session, SignUpResponse::Session(_)));

        let pending: SignUpResponse =
            serde_json::from_str(r#"{"id":"1","email":"a@b.c","confirmation_sent_at":"2024-03-01T00:00:00Z"}"#)
                .unwrap();
        assert!(matches!(pending, SignUpResponse::User(_)));
    }

    #[test]
    fn test_new_row_uses_identity_fields() {
        let identity = Identity {
            user_id: "u1".into(),
            name: String::new(),
            email: "sarah@example.com".into(),
            avatar_url: None,
        };
        let row = UserRow::for_identity(&identity);
        assert_eq!(row.name, "sarah");
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["id"], "u1");
        assert!(json.get("age").is_none());
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let backend = SupabaseBackend::new(config("https://abc.supabase.co/"));
        assert_eq!(backend.endpoint("/auth/v1/signup"), "https://abc.supabase.co/auth/v1/signup");
    }

    #[test]
    fn test_profile_calls_need_a_session() {
        let backend = SupabaseBackend::new(config("http://127.0.0.1:9"));
        let identity = Identity {
            user_id: "u1".into(),
            name: "A".into(),
            email: "a@b.c".into(),
            avatar_url: None,
        };
        assert_eq!(backend.ensure_profile(&identity), Err(BackendError::NotAuthenticated));
        assert_eq!(backend.restore_session(), Ok(None));
        assert_eq!(backend.sign_out(), Ok(()));
    }

    #[test]
    fn test_config_completeness() {
        let defaults = SupabaseConfig::default();
        assert!(!defaults.is_complete());
        assert_eq!(defaults.session_file, Some(PathBuf::from(DEFAULT_SESSION_FILE)));
        assert!(config("https://abc.supabase.co").is_complete());
    }

    #[test]
    fn test_refresh_request_and_response() {
        assert_eq!(refresh_body("r1"), json!({ "refresh_token": "r1" }));

        let refreshed: AuthSession = serde_json::from_str(
            r#"{"access_token":"a2","token_type":"bearer","expires_in":3600,"expires_at":1767225600,
                "refresh_token":"r2","user":{"id":"9f1c","email":"arjun@example.com"}}"#,
        )
        .unwrap();
        assert_eq!(refreshed.access_token, "a2");
        assert_eq!(refreshed.refresh_token, "r2");
        assert_eq!(refreshed.user.identity().user_id, "9f1c");
    }

    #[test]
    fn test_refresh_token_survives_restart() {
        let path = std::env::temp_dir().join(format!("baithak_session_{}.json", std::process::id()));
        let settings = SupabaseConfig {
            session_file: Some(path.clone()),
            ..config("http://127.0.0.1:9")
        };

        let first = SupabaseBackend::new(settings.clone());
        first.store_session(Some(session("r1")));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("a1"));

        let second = SupabaseBackend::new(settings.clone());
        assert_eq!(second.access_token(), Err(BackendError::NotAuthenticated));
        assert_eq!(second.refresh_token().as_deref(), Some("r1"));

        second.store_session(None);
        assert!(!path.exists());
        assert_eq!(SupabaseBackend::new(settings).refresh_token(), None);
    }

    #[test]
    fn test_unreadable_session_file_is_ignored() {
        let path = std::env::temp_dir().join(format!("baithak_session_bad_{}.json", std::process::id()));
        std::fs::write(&path, "not json").unwrap();
        let backend = SupabaseBackend::new(SupabaseConfig {
            session_file: Some(path.clone()),
            ..config("http://127.0.0.1:9")
        });
        assert_eq!(backend.refresh_token(), None);
        std::fs::remove_file(&path).ok();
    }
}
