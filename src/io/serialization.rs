// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Vault serialization and deserialization.
//!
//! This module handles exporting and importing the vault in YAML
//! and JSON formats. The format is picked from the file extension.

use crate::vault::Vault;
use anyhow::{bail, Context, Result};
use std::path::Path;

/// On-disk format of a vault file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            other => bail!("Unsupported file extension: {:?}", other),
        }
    }
}

/// Export the vault to YAML format.
pub fn export_yaml(vault: &Vault, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(vault)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export the vault to JSON format.
pub fn export_json(vault: &Vault, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(vault)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Import a vault from YAML format.
pub fn import_yaml(path: &Path) -> Result<Vault> {
    let yaml = std::fs::read_to_string(path)?;
    let vault = serde_yaml::from_str(&yaml)?;
    Ok(vault)
}

/// Import a vault from JSON format.
pub fn import_json(path: &Path) -> Result<Vault> {
    let json = std::fs::read_to_string(path)?;
    let vault = serde_json::from_str(&json)?;
    Ok(vault)
}

/// Export in the format matching the extension of `path`.
pub fn export_vault(vault: &Vault, path: &Path) -> Result<()> {
    match Format::from_path(path)? {
        Format::Yaml => export_yaml(vault, path),
        Format::Json => export_json(vault, path),
    }
    .with_context(|| format!("writing vault to {}", path.display()))
}

/// Import in the format matching the extension of `path`.
pub fn import_vault(path: &Path) -> Result<Vault> {
    match Format::from_path(path)? {
        Format::Yaml => import_yaml(path),
        Format::Json => import_json(path),
    }
    .with_context(|| format!("reading vault from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("baithak-ser-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_json_export_import() {
        let path = temp("vault.json");
        let vault = Vault::seeded();
        export_vault(&vault, &path).unwrap();
        let back = import_vault(&path).unwrap();
        assert_eq!(back, vault);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_yaml_uses_web_field_names() {
        let path = temp("vault.yml");
        export_vault(&Vault::seeded(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("createdAt"));
        assert!(text.contains("type: PDF"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_empty_vault_imports_as_empty() {
        let path = temp("empty.json");
        export_vault(&Vault::default(), &path).unwrap();
        let back = import_vault(&path).unwrap();
        assert!(back.is_empty());
        assert!(!Vault::seeded().is_empty());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let err = export_vault(&Vault::default(), Path::new("vault.txt")).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }
}
