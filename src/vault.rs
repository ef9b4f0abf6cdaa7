// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Vault state and filtering.
//!
//! The vault owns the list of resource records, derives the filtered view
//! shown on the Vault page and applies upload/upvote/delete. The in-memory
//! operations are total; [`VaultStore`] layers optional file persistence on
//! top and rolls the list back when a save fails.

use crate::models::resource::{Resource, ResourceType, Visibility};
use anyhow::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const ID_LEN: usize = 9;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// What the search query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterMode {
    /// Title, any tag, or the module label.
    #[default]
    All,
    Tag,
    Module,
}

impl FilterMode {
    pub const ALL: [FilterMode; 3] = [FilterMode::All, FilterMode::Tag, FilterMode::Module];

    pub fn label(self) -> &'static str {
        match self {
            FilterMode::All => "All",
            FilterMode::Tag => "Tags",
            FilterMode::Module => "Module",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            FilterMode::All => "Search by title, tag, or module...",
            FilterMode::Tag => "Search by tag...",
            FilterMode::Module => "Search by module...",
        }
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Whether a single record matches the query under the given mode.
///
/// Records without a module never match in `Module` mode, even for an
/// empty query.
pub fn matches(resource: &Resource, query: &str, mode: FilterMode) -> bool {
    let query = query.to_lowercase();
    let tag_hit = || resource.tags.iter().any(|tag| contains_ci(tag, &query));
    let module_hit = || {
        resource
            .module
            .as_deref()
            .is_some_and(|module| contains_ci(module, &query))
    };

    match mode {
        FilterMode::Tag => tag_hit(),
        FilterMode::Module => module_hit(),
        FilterMode::All => contains_ci(&resource.title, &query) || tag_hit() || module_hit(),
    }
}

/// Order-preserving subset of `records` matching `query` under `mode`.
pub fn filter<'a>(records: &'a [Resource], query: &str, mode: FilterMode) -> Vec<&'a Resource> {
    records
        .iter()
        .filter(|resource| matches(resource, query, mode))
        .collect()
}

/// Nine random lowercase base-36 characters.
pub fn random_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ID_LEN)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// In-memory list of resource records, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vault {
    pub resources: Vec<Resource>,
}

impl Vault {
    pub fn new(resources: Vec<Resource>) -> Self {
        Self { resources }
    }

    /// The demo content a fresh vault starts with.
    pub fn seeded() -> Self {
        Self::new(seed_resources())
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    pub fn filtered(&self, query: &str, mode: FilterMode) -> Vec<&Resource> {
        filter(&self.resources, query, mode)
    }

    /// Draw ids until one is not already in use.
    fn fresh_id(&self) -> String {
        let mut rng = rand::rng();
        loop {
            let id = random_id(&mut rng);
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    /// Prepend `record` under a freshly generated id and return that id.
    pub fn upload(&mut self, mut record: Resource) -> String {
        record.id = self.fresh_id();
        let id = record.id.clone();
        self.resources.insert(0, record);
        log::info!("Uploaded resource {}, total: {}", id, self.resources.len());
        id
    }

    /// Add one upvote to the record with `id`. Returns false if there is none.
    pub fn upvote(&mut self, id: &str) -> bool {
        match self.resources.iter_mut().find(|r| r.id == id) {
            Some(resource) => {
                resource.upvotes += 1;
                log::info!("Upvoted {} ({} votes)", id, resource.upvotes);
                true
            }
            None => false,
        }
    }

    /// Remove the record with `id`. Returns false if there is none.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.resources.len();
        self.resources.retain(|r| r.id != id);
        let removed = self.resources.len() != before;
        if removed {
            log::info!("Deleted resource {}, total: {}", id, self.resources.len());
        }
        removed
    }
}

/// A vault optionally backed by a YAML/JSON file.
pub struct VaultStore {
    vault: Vault,
    file: Option<PathBuf>,
}

impl VaultStore {
    /// Load from `file` if it exists, otherwise start from the seed content.
    pub fn open(file: Option<PathBuf>) -> Result<Self> {
        let vault = match &file {
            Some(path) if path.exists() => {
                let vault = crate::io::serialization::import_vault(path)?;
                log::info!("Loaded {} resources from {}", vault.len(), path.display());
                vault
            }
            _ => Vault::seeded(),
        };
        Ok(Self { vault, file })
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    pub fn file(&self) -> Option<&PathBuf> {
        self.file.as_ref()
    }

    /// Replace the whole list (import), persisting it.
    pub fn replace(&mut self, vault: Vault) -> Result<()> {
        self.apply(move |v| {
            *v = vault;
            true
        })
        .map(|_| ())
    }

    /// Run a mutation, then save. A failed save restores the list as it
    /// was before the mutation and returns the error.
    pub fn apply<F>(&mut self, mutation: F) -> Result<bool>
    where
        F: FnOnce(&mut Vault) -> bool,
    {
        let snapshot = self.file.as_ref().map(|_| self.vault.clone());
        let changed = mutation(&mut self.vault);

        if let (true, Some(path), Some(snapshot)) = (changed, &self.file, snapshot) {
            if let Err(e) = crate::io::serialization::export_vault(&self.vault, path) {
                log::error!("Failed to save vault to {}: {:#}", path.display(), e);
                self.vault = snapshot;
                return Err(e);
            }
        }
        Ok(changed)
    }
}

#[allow(clippy::too_many_arguments)]
fn seed(
    id: &str,
    title: &str,
    description: &str,
    resource_type: ResourceType,
    tags: &[&str],
    url: &str,
    upvotes: u64,
    visibility: Visibility,
    author: &str,
    created_at: &str,
    thumbnail: Option<&str>,
) -> Resource {
    Resource {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        resource_type,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        module: None,
        url: url.to_string(),
        thumbnail: thumbnail.map(str::to_string),
        upvotes,
        visibility,
        author: author.to_string(),
        created_at: created_at.to_string(),
    }
}

fn seed_resources() -> Vec<Resource> {
    use ResourceType::{Image, Link, Pdf};
    use Visibility::{Private, Public};

    vec![
        seed("1", "Calculus II Cheat Sheet", "A comprehensive cheat sheet for integrals and series.",
            Pdf, &["Math", "Calculus", "Cheat Sheet"], "#", 24, Public, "Arjun Sharma", "2024-03-15", None),
        seed("2", "Physics Mechanics Notes", "Handwritten notes for classical mechanics modules.",
            Image, &["Physics", "Mechanics", "Notes"], "#", 12, Private, "Arjun Sharma", "2024-03-10", None),
        seed("3", "React Hooks Guide", "Official documentation link for React Hooks.",
            Link, &["CS", "React", "Web Dev"], "https://react.dev", 56, Public, "Arjun Sharma", "2024-03-01", None),
        seed("4", "Design System Principles", "Guide to atomic design and reusable components.",
            Pdf, &["Design", "UI/UX"], "#", 89, Public, "Sarah Lee", "2024-03-20",
            Some("https://images.unsplash.com/photo-1561070791-2526d30994b5?w=500&auto=format&fit=crop&q=60")),
        seed("5", "Machine Learning Basics", "Introductory slides for ML, covering regression and classification.",
            Pdf, &["AI", "ML", "Data Science"], "#", 120, Public, "David Chen", "2024-03-22", None),
        seed("6", "Web Accessibility Checklist", "Ensure your sites are accessible to everyone.",
            Link, &["Web", "A11y"], "#", 45, Public, "Arjun Sharma", "2024-03-25",
            Some("https://images.unsplash.com/photo-1507238691740-187a5b1d37b8?w=500&auto=format&fit=crop&q=60")),
        seed("7", "Advanced CSS Tricks", "Cool CSS effects and layouts.",
            Link, &["CSS", "Frontend"], "#", 30, Public, "Sarah Lee", "2024-03-28", None),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn record(id: &str, title: &str, tags: &[&str], module: Option<&str>) -> Resource {
        Resource {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            resource_type: ResourceType::Pdf,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            module: module.map(str::to_string),
            url: "#".to_string(),
            thumbnail: None,
            upvotes: 0,
            visibility: Visibility::Public,
            author: "Tester".to_string(),
            created_at: "2024-01-01".to_string(),
        }
    }

    fn five() -> Vault {
        Vault::new(vec![
            record("a", "Linear Algebra", &["Math"], Some("MA101")),
            record("b", "Organic Chemistry", &["Chem"], None),
            record("c", "Operating Systems", &["CS", "Kernel"], Some("CS330")),
            record("d", "Mechanics", &["Physics"], None),
            record("e", "Data Structures", &["CS"], Some("CS201")),
        ])
    }

    fn ids(view: &[&Resource]) -> Vec<String> {
        view.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_empty_query_all_returns_everything_in_order() {
        let vault = five();
        assert_eq!(ids(&vault.filtered("", FilterMode::All)), vec!["a", "b", "c", "d", "e"]);
        assert_eq!(vault.filtered("", FilterMode::Tag).len(), 5);
    }

    #[test]
    fn test_query_matches_tag_case_insensitively() {
        let vault = five();
        assert_eq!(ids(&vault.filtered("math", FilterMode::All)), vec!["a"]);
        assert_eq!(ids(&vault.filtered("MATH", FilterMode::Tag)), vec!["a"]);
    }

    #[test]
    fn test_all_mode_matches_title_and_module() {
        let vault = five();
        assert_eq!(ids(&vault.filtered("chemistry", FilterMode::All)), vec!["b"]);
        assert_eq!(ids(&vault.filtered("cs2", FilterMode::All)), vec!["e"]);
    }

    #[test]
    fn test_tag_mode_ignores_title() {
        let vault = five();
        assert!(vault.filtered("linear", FilterMode::Tag).is_empty());
    }

    #[test]
    fn test_module_mode_excludes_records_without_module() {
        let vault = five();
        assert_eq!(ids(&vault.filtered("", FilterMode::Module)), vec!["a", "c", "e"]);
        assert_eq!(ids(&vault.filtered("cs", FilterMode::Module)), vec!["c", "e"]);
        assert!(vault.filtered("x", FilterMode::Module).is_empty());
    }

    #[test]
    fn test_upvote_touches_only_the_target() {
        let mut vault = five();
        vault.resources[3].upvotes = 7;
        let before = vault.clone();

        assert!(vault.upvote("d"));
        assert_eq!(vault.get("d").map(|r| r.upvotes), Some(8));
        for (after, before) in vault.resources.iter().zip(&before.resources) {
            if after.id != "d" {
                assert_eq!(after, before);
            }
        }
    }

    #[test]
    fn test_upvote_is_unbounded_and_missing_id_is_noop() {
        let mut vault = five();
        for _ in 0..3 {
            vault.upvote("a");
        }
        assert_eq!(vault.get("a").map(|r| r.upvotes), Some(3));

        let before = vault.clone();
        assert!(!vault.upvote("nonexistent"));
        assert_eq!(vault, before);
    }

    #[test]
    fn test_delete_removes_only_target_and_is_idempotent() {
        let mut vault = five();
        assert!(vault.delete("c"));
        assert_eq!(vault.len(), 4);
        assert!(vault.get("c").is_none());
        assert_eq!(ids(&vault.filtered("", FilterMode::All)), vec!["a", "b", "d", "e"]);

        let before = vault.clone();
        assert!(!vault.delete("c"));
        assert_eq!(vault, before);
    }

    #[test]
    fn test_upload_prepends_with_fresh_id() {
        let mut vault = five();
        let id = vault.upload(record("a", "New", &[], None));
        assert_eq!(vault.len(), 6);
        assert_eq!(vault.resources[0].id, id);
        assert_eq!(vault.resources[0].title, "New");
        assert_eq!(id.len(), ID_LEN);
        assert!(id.bytes().all(|b| ID_ALPHABET.contains(&b)));
        assert_eq!(vault.resources.iter().filter(|r| r.id == id).count(), 1);
    }

    #[test]
    fn test_ten_thousand_uploads_never_collide() {
        let mut vault = Vault::default();
        for i in 0..10_000 {
            vault.upload(record("", &format!("r{i}"), &[], None));
        }
        let unique: HashSet<&str> = vault.resources.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(unique.len(), 10_000);
    }

    #[test]
    fn test_seed_content() {
        let vault = Vault::seeded();
        assert_eq!(vault.len(), 7);
        assert_eq!(ids(&vault.filtered("math", FilterMode::All)), vec!["1"]);
    }

    #[test]
    fn test_store_persists_and_reloads() {
        let path = std::env::temp_dir().join(format!("baithak-vault-{}.yaml", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let mut store = VaultStore::open(Some(path.clone())).unwrap();
        assert_eq!(store.vault().len(), 7);
        assert!(store.apply(|v| v.upvote("5")).unwrap());

        let reopened = VaultStore::open(Some(path.clone())).unwrap();
        assert_eq!(reopened.vault().get("5").map(|r| r.upvotes), Some(121));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_store_rolls_back_when_save_fails() {
        let dir = std::env::temp_dir().join(format!("baithak-missing-{}", std::process::id()));
        let path = dir.join("nested").join("vault.json");
        let mut store = VaultStore {
            vault: five(),
            file: Some(path),
        };

        let result = store.apply(|v| v.delete("a"));
        assert!(result.is_err());
        assert_eq!(store.vault(), &five());
    }

    #[test]
    fn test_store_noop_mutation_skips_save() {
        let path = std::env::temp_dir().join("baithak-never-written").join("vault.json");
        let mut store = VaultStore {
            vault: five(),
            file: Some(path),
        };
        assert!(!store.apply(|v| v.delete("nonexistent")).unwrap());
    }
}
