// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! In-process backend for development: accounts and profiles live in
//! memory for the lifetime of the app.

use super::{BackendError, BackendResult, IdentityProvider, ProfileStore, SignUp};
use crate::models::identity::Identity;
use crate::models::profile::{ProfileUpdate, UserProfile};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

struct Account {
    password: String,
    identity: Identity,
}

#[derive(Default)]
struct State {
    accounts: HashMap<String, Account>,
    profiles: HashMap<String, UserProfile>,
    session: Option<Identity>,
    next_id: u64,
}

#[derive(Default)]
pub struct LocalBackend {
    state: Mutex<State>,
}

impl LocalBackend {
    fn state(&self) -> BackendResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| BackendError::Remote("local backend state poisoned".into()))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl IdentityProvider for LocalBackend {
    fn restore_session(&self) -> BackendResult<Option<Identity>> {
        Ok(self.state()?.session.clone())
    }

    fn sign_in(&self, email: &str, password: &str) -> BackendResult<Identity> {
        let mut state = self.state()?;
        let identity = match state.accounts.get(&normalize_email(email)) {
            Some(account) if account.password == password => account.identity.clone(),
            _ => return Err(BackendError::Unauthorized("Invalid login credentials".into())),
        };
        state.session = Some(identity.clone());
        Ok(identity)
    }

    fn sign_up(&self, email: &str, password: &str, name: Option<&str>) -> BackendResult<SignUp> {
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(BackendError::Remote("Unable to validate email address: invalid format".into()));
        }
        if password.len() < 6 {
            return Err(BackendError::Remote("Password should be at least 6 characters".into()));
        }

        let mut state = self.state()?;
        if state.accounts.contains_key(&email) {
            return Err(BackendError::Remote("User already registered".into()));
        }

        state.next_id += 1;
        let identity = Identity {
            user_id: format!("local-{}", state.next_id),
            name: name.map(str::trim).unwrap_or_default().to_string(),
            email: email.clone(),
            avatar_url: None,
        };
        state.accounts.insert(
            email,
            Account {
                password: password.to_string(),
                identity: identity.clone(),
            },
        );
        state.session = Some(identity.clone());
        Ok(SignUp::SignedIn(identity))
    }

    fn sign_out(&self) -> BackendResult<()> {
        self.state()?.session = None;
        Ok(())
    }
}

impl ProfileStore for LocalBackend {
    fn ensure_profile(&self, identity: &Identity) -> BackendResult<UserProfile> {
        let mut state = self.state()?;
        let profile = state
            .profiles
            .entry(identity.user_id.clone())
            .or_insert_with(|| UserProfile::from_identity(identity));

        if profile.drifted_from(identity) {
            profile.name = identity.display_name();
            profile.image = identity.avatar_url.clone();
        }
        Ok(profile.clone())
    }

    fn save_profile(&self, identity: &Identity, update: &ProfileUpdate) -> BackendResult<UserProfile> {
        if self.state()?.session.as_ref().map(|s| &s.user_id) != Some(&identity.user_id) {
            return Err(BackendError::NotAuthenticated);
        }
        let mut state = self.state()?;
        let profile = state
            .profiles
            .entry(identity.user_id.clone())
            .or_insert_with(|| UserProfile::from_identity(identity));
        update.apply_to(profile);
        Ok(profile.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_up(backend: &LocalBackend) -> Identity {
        match backend.sign_up("Meet@Uni.edu", "secret1", Some("Meet Jain")).unwrap() {
            SignUp::SignedIn(identity) => identity,
            SignUp::ConfirmationRequired => panic!("local sign-up never needs confirmation"),
        }
    }

    #[test]
    fn test_sign_up_then_sign_in() {
        let backend = LocalBackend::default();
        let identity = signed_up(&backend);
        assert_eq!(identity.email, "meet@uni.edu");
        backend.sign_out().unwrap();
        assert_eq!(backend.restore_session().unwrap(), None);

        let again = backend.sign_in("meet@uni.edu", "secret1").unwrap();
        assert_eq!(again, identity);
        assert_eq!(backend.restore_session().unwrap(), Some(identity));
    }

    #[test]
    fn test_wrong_password_is_unauthorized() {
        let backend = LocalBackend::default();
        signed_up(&backend);
        let err = backend.sign_in("meet@uni.edu", "nope").unwrap_err();
        assert!(matches!(err, BackendError::Unauthorized(_)));
    }

    #[test]
    fn test_duplicate_and_weak_sign_ups_are_rejected() {
        let backend = LocalBackend::default();
        signed_up(&backend);
        assert!(backend.sign_up("meet@uni.edu", "secret1", None).is_err());
        assert!(backend.sign_up("other@uni.edu", "123", None).is_err());
        assert!(backend.sign_up("not-an-email", "secret1", None).is_err());
    }

    #[test]
    fn test_one_profile_per_identity_with_drift_reconciled() {
        let backend = LocalBackend::default();
        let mut identity = signed_up(&backend);
        let first = backend.ensure_profile(&identity).unwrap();
        let second = backend.ensure_profile(&identity).unwrap();
        assert_eq!(first, second);

        identity.avatar_url = Some("https://img/new.png".into());
        let reconciled = backend.ensure_profile(&identity).unwrap();
        assert_eq!(reconciled.id, first.id);
        assert_eq!(reconciled.image.as_deref(), Some("https://img/new.png"));
    }

    #[test]
    fn test_save_profile_requires_session() {
        let backend = LocalBackend::default();
        let identity = signed_up(&backend);
        let update = ProfileUpdate {
            name: "Meet Jain".into(),
            university: "IIT Bombay".into(),
            stream: Some("Engineering".into()),
            age: Some(20),
            gender: Some("Male".into()),
        };
        let saved = backend.save_profile(&identity, &update).unwrap();
        assert_eq!(saved.age, Some(20));
        assert_eq!(backend.ensure_profile(&identity).unwrap().university.as_deref(), Some("IIT Bombay"));

        backend.sign_out().unwrap();
        assert_eq!(backend.save_profile(&identity, &update), Err(BackendError::NotAuthenticated));
    }
}
