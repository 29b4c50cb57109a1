// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! package.json generation

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::GeneratedFile;
use crate::config::ManifestConfig;
use crate::draft::ValidatedDraft;
use crate::errors::{ForjaError, ForjaResult};

pub const MANIFEST_FILE: &str = "package.json";

/// The generated project's package manifest
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    pub private: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub scripts: BTreeMap<String, String>,
    pub dependencies: BTreeMap<String, String>,
    pub dev_dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    /// Manifest for a draft, with catalog versions for `packages`
    ///
    /// Packages that are already base dependencies, or that the catalog does
    /// not know, are not added.
    pub fn for_draft(
        draft: &ValidatedDraft,
        config: &ManifestConfig,
        packages: &BTreeSet<String>,
    ) -> Self {
        let mut dependencies = config.dependencies.clone();
        for package in packages {
            if dependencies.contains_key(package) || config.dev_dependencies.contains_key(package) {
                continue;
            }
            if let Some(version) = config.catalog.get(package) {
                dependencies.insert(package.clone(), version.clone());
            }
        }

        let description = Some(match &draft.base_campaign_id {
            Some(base) => format!(
                "Standalone landing page for campaign draft {} (based on {})",
                draft.id, base
            ),
            None => format!("Standalone landing page for campaign draft {}", draft.id),
        });

        let scripts = [("build", "next build"), ("dev", "next dev"), ("start", "next start")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Self {
            name: format!("campaign-{}", draft.id.to_lowercase()),
            version: format!("1.0.{}", draft.version.unwrap_or(0)),
            private: true,
            description,
            scripts,
            dependencies,
            dev_dependencies: config.dev_dependencies.clone(),
        }
    }
}

/// Generate package.json
///
/// `packages` are the third-party packages imported by copied components; it
/// is empty before the copy step runs.
pub fn generate_manifest(
    draft: &ValidatedDraft,
    config: &ManifestConfig,
    packages: &BTreeSet<String>,
) -> ForjaResult<GeneratedFile> {
    let manifest = PackageManifest::for_draft(draft, config, packages);
    let mut contents = serde_json::to_string_pretty(&manifest)
        .map_err(|e| ForjaError::generation(MANIFEST_FILE, e.to_string()))?;
    contents.push('\n');

    Ok(GeneratedFile::new(MANIFEST_FILE, contents))
}

/// Imported packages the manifest cannot declare because the catalog lacks them
pub fn uncatalogued_packages(config: &ManifestConfig, packages: &BTreeSet<String>) -> Vec<String> {
    packages
        .iter()
        .filter(|p| {
            !config.dependencies.contains_key(*p)
                && !config.dev_dependencies.contains_key(*p)
                && !config.catalog.contains_key(*p)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::test_support::minimal_draft;

    #[test]
    fn test_base_manifest() {
        let draft = minimal_draft();
        let file = generate_manifest(&draft, &ManifestConfig::default(), &BTreeSet::new()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&file.contents).unwrap();

        assert_eq!(file.path.to_str(), Some("package.json"));
        assert_eq!(json["name"], "campaign-abc123");
        assert_eq!(json["version"], "1.0.3");
        assert_eq!(json["private"], true);
        assert_eq!(json["scripts"]["build"], "next build");
        assert!(json["dependencies"]["next"].is_string());
        assert!(json["dependencies"].get("framer-motion").is_none());
        assert!(json["devDependencies"]["typescript"].is_string());
    }

    #[test]
    fn test_adds_catalogued_imports_only() {
        let draft = minimal_draft();
        let packages: BTreeSet<String> = ["clsx", "react", "left-pad"]
            .into_iter()
            .map(String::from)
            .collect();
        let config = ManifestConfig::default();

        let file = generate_manifest(&draft, &config, &packages).unwrap();
        let json: serde_json::Value = serde_json::from_str(&file.contents).unwrap();

        assert_eq!(json["dependencies"]["clsx"], "2.1.1");
        assert!(json["dependencies"].get("left-pad").is_none());
        assert_eq!(uncatalogued_packages(&config, &packages), vec!["left-pad"]);
    }

    #[test]
    fn test_manifest_is_deterministic() {
        let draft = minimal_draft();
        let config = ManifestConfig::default();
        let a = generate_manifest(&draft, &config, &BTreeSet::new()).unwrap();
        let b = generate_manifest(&draft, &config, &BTreeSet::new()).unwrap();
        assert_eq!(a, b);
    }
}
