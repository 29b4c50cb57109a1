// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Code generators
//!
//! Pure functions from a validated draft to the text of each static file the
//! standalone project needs. Generators never touch the filesystem; the
//! pipeline writes their output with [`write_all`].
//!
//! Output is deterministic: every map is ordered and nothing time-dependent is
//! embedded, so generating twice from the same draft yields identical bytes.

mod config;
mod fonts;
mod layout;
mod manifest;
mod page;
mod styles;
mod theme;

pub use config::generate_build_configs;
pub use fonts::{required_fonts, FontFamily, FONT_CATALOG};
pub use layout::generate_root_layout;
pub use manifest::{generate_manifest, uncatalogued_packages, PackageManifest};
pub use page::generate_root_page;
pub use styles::generate_stylesheet;
pub use theme::{generate_theme_entrypoint, theme_entrypoint_path};

use std::path::{Path, PathBuf};

use crate::errors::{ForjaError, ForjaResult};

/// Banner placed at the top of generated source files
pub(crate) fn banner(draft_id: &str) -> String {
    format!(
        "// Generated by forja for campaign draft {}. Do not edit by hand.\n",
        draft_id
    )
}

/// A generated file, relative to the project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>, contents: String) -> Self {
        Self {
            path: path.into(),
            contents,
        }
    }
}

/// Write generated files under `root`, creating parent directories
///
/// Returns the absolute paths written, in input order.
pub async fn write_all(root: &Path, files: &[GeneratedFile]) -> ForjaResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(files.len());

    for file in files {
        let target = root.join(&file.path);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ForjaError::FileWriteError {
                    path: parent.to_path_buf(),
                    error: e.to_string(),
                })?;
        }

        tokio::fs::write(&target, &file.contents)
            .await
            .map_err(|e| ForjaError::FileWriteError {
                path: target.clone(),
                error: e.to_string(),
            })?;

        tracing::debug!(path = %target.display(), bytes = file.contents.len(), "wrote generated file");
        written.push(target);
    }

    Ok(written)
}

/// Quote a value as a JavaScript/TypeScript string literal
pub(crate) fn js_string(value: &str) -> String {
    // JSON string syntax is a subset of JS string syntax
    serde_json::Value::String(value.to_string()).to_string()
}
