// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Read from `baithak.yaml` in the working directory (or the file named by
//! `BAITHAK_CONFIG`), then overridden by environment variables. Every field
//! has a default, so running with neither works and uses the local backend.

use crate::backend::convex::{ConvexBackend, ConvexConfig};
use crate::backend::supabase::{SupabaseBackend, SupabaseConfig};
use crate::backend::{Backend, BackendKind};
use crate::sequence::frames::FrameSequence;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_CONFIG_FILE: &str = "baithak.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn visuals(self) -> egui::Visuals {
        match self {
            Theme::Dark => egui::Visuals::dark(),
            Theme::Light => egui::Visuals::light(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Frame `i` lives at `<path_template><i+1 as 3 digits>.jpg`.
    pub path_template: String,
    pub frame_count: usize,
    pub max_in_flight: usize,
    /// Height of the scroll region in viewport heights.
    pub scroll_pages: f32,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            path_template: "assets/sequence/ezgif-frame-".to_string(),
            frame_count: 241,
            max_in_flight: 6,
            scroll_pages: 4.0,
        }
    }
}

impl SequenceConfig {
    pub fn sequence(&self) -> FrameSequence {
        FrameSequence::new(self.path_template.clone(), self.frame_count)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// YAML or JSON file the vault is loaded from and saved to.
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendKind,
    pub supabase: SupabaseConfig,
    pub convex: ConvexConfig,
    pub sequence: SequenceConfig,
    pub vault: VaultConfig,
    pub theme: Theme,
}

impl AppConfig {
    /// Load from the config file if there is one, then apply the environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os("BAITHAK_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Override fields from environment variables, read through `var`.
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(kind) = var("BAITHAK_BACKEND") {
            self.backend = serde_yaml::from_str(&kind.to_lowercase())
                .with_context(|| format!("Unknown backend '{}'", kind))?;
        }
        if let Some(url) = var("SUPABASE_URL") {
            self.supabase.url = url;
        }
        if let Some(key) = var("SUPABASE_ANON_KEY") {
            self.supabase.anon_key = key;
        }
        if let Some(url) = var("CONVEX_URL") {
            self.convex.url = url;
        }
        if let Some(token) = var("CONVEX_AUTH_TOKEN") {
            self.convex.auth_token = Some(token);
        }
        Ok(())
    }

    /// The backend that will actually be used. Missing credentials fall back
    /// to the local backend with a warning.
    pub fn effective_backend(&self) -> BackendKind {
        match self.backend {
            BackendKind::Supabase if !self.supabase.is_complete() => {
                log::warn!("Supabase credentials not found, falling back to the local backend");
                BackendKind::Local
            }
            BackendKind::Convex if !self.convex.is_complete() => {
                log::warn!("Convex deployment URL not set, falling back to the local backend");
                BackendKind::Local
            }
            kind => kind,
        }
    }

    pub fn build_backend(&self) -> Backend {
        let kind = self.effective_backend();
        log::info!("Using {} backend", kind.label());
        match kind {
            BackendKind::Local => Backend::local(),
            BackendKind::Supabase => {
                let supabase = Arc::new(SupabaseBackend::new(self.supabase.clone()));
                Backend {
                    kind,
                    identity: supabase.clone(),
                    profiles: supabase,
                }
            }
            BackendKind::Convex => {
                let convex = Arc::new(ConvexBackend::new(self.convex.clone()));
                Backend {
                    kind,
                    identity: convex.clone(),
                    profiles: convex,
                }
            }
        }
    }
}
