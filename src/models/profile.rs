// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! User profile and the edits made to it.
//!
//! Both backends store a `users` row per identity; the relational variant
//! keys it by the auth user id, the reactive variant by the identity token.

use super::identity::Identity;
use serde::{Deserialize, Serialize};

/// Streams offered by the profile form.
pub const STREAMS: [&str; 7] = [
    "Engineering",
    "Medical",
    "Arts",
    "Commerce",
    "Law",
    "Management",
    "Other",
];

/// Placeholder the reactive backend writes for fields not yet filled in.
pub const NOT_SET: &str = "Not Set";

pub const MIN_AGE: u8 = 10;
pub const MAX_AGE: u8 = 100;

/// A stored user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub university: Option<String>,
    #[serde(default)]
    pub stream: Option<String>,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub gender: Option<String>,
}

impl UserProfile {
    /// Best-effort profile built from provider metadata alone.
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            id: identity.user_id.clone(),
            email: identity.email.clone(),
            name: identity.display_name(),
            image: identity.avatar_url.clone(),
            university: None,
            stream: None,
            age: None,
            gender: None,
        }
    }

    /// Whether the provider's name or picture have drifted from the stored row.
    pub fn drifted_from(&self, identity: &Identity) -> bool {
        self.name != identity.display_name() || self.image != identity.avatar_url
    }

    /// Uppercase first letter of the name, for avatar placeholders.
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "?".to_string())
    }

    /// A field is considered filled unless it is absent, blank or the
    /// reactive backend's placeholder.
    pub fn field_is_set(value: &Option<String>) -> bool {
        matches!(value, Some(v) if !v.trim().is_empty() && v != NOT_SET)
    }
}

/// Which profile field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Name,
    University,
    Stream,
    Age,
}

/// Edits submitted from the profile form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub university: String,
    pub stream: Option<String>,
    pub age: Option<u8>,
    pub gender: Option<String>,
}

impl ProfileUpdate {
    /// Prefill the form from a stored profile.
    pub fn from_profile(profile: &UserProfile) -> Self {
        let keep = |v: &Option<String>| {
            if UserProfile::field_is_set(v) {
                v.clone()
            } else {
                None
            }
        };
        Self {
            name: profile.name.clone(),
            university: keep(&profile.university).unwrap_or_default(),
            stream: keep(&profile.stream),
            age: profile.age,
            gender: keep(&profile.gender),
        }
    }

    /// Check required fields and ranges, returning the first offending field.
    pub fn validate(&self) -> Result<(), ProfileField> {
        if self.name.trim().is_empty() {
            return Err(ProfileField::Name);
        }
        if self.university.trim().is_empty() {
            return Err(ProfileField::University);
        }
        if let Some(stream) = &self.stream {
            if !STREAMS.contains(&stream.as_str()) {
                return Err(ProfileField::Stream);
            }
        }
        if let Some(age) = self.age {
            if !(MIN_AGE..=MAX_AGE).contains(&age) {
                return Err(ProfileField::Age);
            }
        }
        Ok(())
    }

    /// Apply the edits on top of a stored profile.
    pub fn apply_to(&self, profile: &mut UserProfile) {
        profile.name = self.name.trim().to_string();
        profile.university = Some(self.university.trim().to_string());
        profile.stream = self.stream.clone();
        profile.age = self.age;
        profile.gender = self.gender.clone().filter(|g| !g.trim().is_empty());
    }
}
