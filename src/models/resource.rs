// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Vault resource records.
//!
//! This module defines the records held by the vault: documents, images
//! and links with tags, an optional module label, visibility and upvotes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of resource stored in the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceType {
    #[serde(rename = "PDF")]
    Pdf,
    Image,
    Link,
}

impl ResourceType {
    pub const ALL: [ResourceType; 3] = [ResourceType::Pdf, ResourceType::Image, ResourceType::Link];
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceType::Pdf => write!(f, "PDF"),
            ResourceType::Image => write!(f, "Image"),
            ResourceType::Link => write!(f, "Link"),
        }
    }
}

/// Who can see a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "Public"),
            Visibility::Private => write!(f, "Private"),
        }
    }
}

/// A single vault entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub upvotes: u64,
    pub visibility: Visibility,
    pub author: String,
    pub created_at: String,
}

impl Resource {
    /// Tags shown on a card, at most three.
    pub fn badge_tags(&self) -> &[String] {
        &self.tags[..self.tags.len().min(3)]
    }
}

/// Form contents of the upload dialog, before an id is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadDraft {
    pub title: String,
    pub description: String,
    pub resource_type: ResourceType,
    pub visibility: Visibility,
    /// Comma separated, as typed.
    pub tags: String,
    pub url: String,
    pub module: String,
}

impl Default for UploadDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            resource_type: ResourceType::Pdf,
            visibility: Visibility::Public,
            tags: String::new(),
            url: String::new(),
            module: String::new(),
        }
    }
}

impl UploadDraft {
    /// The title is the only required field.
    pub fn is_submittable(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Split the comma separated tag field, trimming and dropping empties.
    pub fn parsed_tags(&self) -> Vec<String> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Build a record with the given id, author and creation timestamp.
    pub fn into_resource(self, id: String, author: String, created_at: String) -> Resource {
        let tags = self.parsed_tags();
        let module = Some(self.module.trim().to_string()).filter(|m| !m.is_empty());
        let url = if self.url.trim().is_empty() {
            "#".to_string()
        } else {
            self.url.trim().to_string()
        };

        Resource {
            id,
            title: self.title,
            description: self.description,
            resource_type: self.resource_type,
            tags,
            module,
            url,
            thumbnail: None,
            upvotes: 0,
            visibility: self.visibility,
            author,
            created_at,
        }
    }
}
