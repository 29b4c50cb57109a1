// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Engine configuration
//!
//! Loaded from `forja.yaml`. Every section is optional and falls back to the
//! layout of the platform's source tree and a Next-style static export.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{ForjaError, ForjaResult};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "forja.yaml";

/// Engine configuration from forja.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForjaConfig {
    /// Root of the platform source tree components are copied from
    pub source_root: PathBuf,

    /// Directory holding per-run scratch directories and archives
    pub scratch_root: PathBuf,

    /// Where things live inside the source tree
    pub layout: LayoutConfig,

    /// External build toolchain
    pub build: BuildConfig,

    /// Generated package manifest
    pub manifest: ManifestConfig,

    /// Archive contents
    pub package: PackageConfig,

    /// Artifact destination
    pub upload: UploadConfig,
}

impl Default for ForjaConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("."),
            scratch_root: std::env::temp_dir(),
            layout: LayoutConfig::default(),
            build: BuildConfig::default(),
            manifest: ManifestConfig::default(),
            package: PackageConfig::default(),
            upload: UploadConfig::default(),
        }
    }
}

impl ForjaConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> ForjaResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ForjaError::FileReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> ForjaResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is absent
    ///
    /// An explicitly requested file must exist; the default file is optional.
    pub fn load(explicit: Option<&Path>) -> ForjaResult<Self> {
        match explicit {
            Some(path) if !path.exists() => Err(ForjaError::ConfigNotFound {
                path: path.to_path_buf(),
            }),
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Serialize configuration to YAML
    pub fn to_yaml(&self) -> ForjaResult<String> {
        serde_yaml::to_string(self).map_err(Into::into)
    }

    /// Check values serde cannot express
    pub fn validate(&self) -> ForjaResult<()> {
        if self.build.command.trim().is_empty() {
            return Err(invalid("build.command is empty"));
        }
        if self.build.shell.trim().is_empty() {
            return Err(invalid("build.shell is empty"));
        }
        if self.build.timeout_secs == 0 {
            return Err(invalid("build.timeout_secs must be greater than zero"));
        }
        if self.build.output_dir.is_absolute() {
            return Err(invalid("build.output_dir must be relative to the project root"));
        }
        if !self.layout.alias_prefix.ends_with('/') || self.layout.alias_prefix.len() < 2 {
            return Err(invalid("layout.alias_prefix must be non-empty and end with '/'"));
        }

        Ok(())
    }
}

fn invalid(reason: &str) -> ForjaError {
    ForjaError::InvalidConfig {
        reason: reason.to_string(),
    }
}

/// Locations inside the platform source tree, relative to `source_root`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Import prefix meaning "from the shared source root"
    pub alias_prefix: String,

    /// Directory the alias prefix maps to
    pub alias_root: PathBuf,

    /// Section dispatch component, always an entry point
    pub dispatcher: PathBuf,

    /// Directory holding one implementation per section name
    pub sections_dir: PathBuf,

    /// Directory holding header components
    pub headers_dir: PathBuf,

    /// Directory holding footer components
    pub footers_dir: PathBuf,

    /// Theme fragment store (`<kind>/<preset>.json`)
    pub theme_dir: PathBuf,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            alias_prefix: "@/".to_string(),
            alias_root: PathBuf::from("src"),
            dispatcher: PathBuf::from("src/components/campaign/SectionRenderer.tsx"),
            sections_dir: PathBuf::from("src/components/sections"),
            headers_dir: PathBuf::from("src/components/layout/headers"),
            footers_dir: PathBuf::from("src/components/layout/footers"),
            theme_dir: PathBuf::from("src/theme/fragments"),
        }
    }
}

impl LayoutConfig {
    /// Alias specifier (without prefix) for a path under the alias root
    ///
    /// `src/components/sections` becomes `components/sections`.
    pub fn alias_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.alias_root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// External build toolchain settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Shell used to run the command
    pub shell: String,

    /// Command run in the generated project root
    pub command: String,

    /// Directory (relative to the project root) the build writes its output to
    pub output_dir: PathBuf,

    /// Upper bound on the build's wall-clock time
    pub timeout_secs: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            shell: "sh".to_string(),
            command: "npm install --no-audit --no-fund && npm run build".to_string(),
            output_dir: PathBuf::from("out"),
            timeout_secs: 900,
        }
    }
}

/// Generated package.json settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Runtime dependencies every generated project needs
    pub dependencies: BTreeMap<String, String>,

    /// Build-only dependencies the build step requires
    pub dev_dependencies: BTreeMap<String, String>,

    /// Versions for third-party packages that copied components may import
    pub catalog: BTreeMap<String, String>,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        let pairs = |items: &[(&str, &str)]| {
            items
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>()
        };

        Self {
            dependencies: pairs(&[
                ("next", "14.2.5"),
                ("react", "18.3.1"),
                ("react-dom", "18.3.1"),
            ]),
            dev_dependencies: pairs(&[
                ("@types/node", "20.14.10"),
                ("@types/react", "18.3.3"),
                ("@types/react-dom", "18.3.0"),
                ("autoprefixer", "10.4.19"),
                ("postcss", "8.4.39"),
                ("tailwindcss", "3.4.6"),
                ("typescript", "5.5.3"),
            ]),
            catalog: pairs(&[
                ("class-variance-authority", "0.7.0"),
                ("clsx", "2.1.1"),
                ("framer-motion", "11.3.8"),
                ("lucide-react", "0.408.0"),
                ("tailwind-merge", "2.4.0"),
            ]),
        }
    }
}

/// What the archive contains
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageSource {
    /// The whole generated project, build output included
    #[default]
    Project,
    /// Only the build output directory
    BuildOutput,
}

/// Archive settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Directory that gets archived
    pub source: PackageSource,

    /// Top-level directory names left out of the archive
    pub exclude: Vec<String>,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            source: PackageSource::Project,
            exclude: vec!["node_modules".to_string(), ".next".to_string()],
        }
    }
}

/// Filesystem upload sink settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Directory artifacts are published into
    pub root: PathBuf,

    /// URL prefix the published directory is served under
    pub public_base_url: String,

    /// Key prefix for every artifact
    pub key_prefix: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("artifacts"),
            public_base_url: "file://artifacts".to_string(),
            key_prefix: "campaigns".to_string(),
        }
    }
}
