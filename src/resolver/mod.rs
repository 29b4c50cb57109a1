// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Dependency resolver (component copier)
//!
//! Computes the set of source files reachable from the campaign's entry
//! points by following aliased imports, and copies exactly that set into the
//! generated project, preserving relative paths.
//!
//! The import graph is never materialized. Traversal is depth-first over an
//! explicit stack with a visited set keyed by canonical path, so cycles
//! terminate and every file is read and copied at most once.

mod imports;

pub use imports::{classify, package_name, scan_imports, ImportKind};

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Component, Path, PathBuf};

use crate::config::{ForjaConfig, LayoutConfig};
use crate::draft::ValidatedDraft;
use crate::errors::{ForjaError, ForjaResult};

/// Suffixes tried, in order, when mapping a logical import path to a file
pub const RESOLVE_SUFFIXES: &[&str] = &[
    "",
    ".tsx",
    ".ts",
    ".jsx",
    ".js",
    "/index.tsx",
    "/index.ts",
    "/index.jsx",
    "/index.js",
];

/// An aliased import that could not be mapped to a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedImport {
    /// Importing file, relative to the source root
    pub from: PathBuf,
    pub specifier: String,
}

/// Result of a traversal
#[derive(Debug, Clone, Default)]
pub struct Closure {
    /// Reached files relative to the source root, in visit order
    pub files: Vec<PathBuf>,
    /// Third-party packages imported by reached files
    pub packages: BTreeSet<String>,
    /// Aliased imports that were skipped
    pub unresolved: Vec<UnresolvedImport>,
}

enum Resolution {
    File(PathBuf),
    Provided,
    Missing,
}

/// Resolver over one platform source tree
pub struct DependencyResolver {
    /// Canonical source root
    source_root: PathBuf,
    /// Alias root relative to the source root
    alias_root: PathBuf,
    alias_prefix: String,
    /// Paths (relative to the source root) the generated project already has
    provided: HashSet<PathBuf>,
}

impl DependencyResolver {
    /// Create a resolver for a source tree
    pub fn new(source_root: &Path, alias_prefix: &str, alias_root: &Path) -> ForjaResult<Self> {
        let source_root =
            std::fs::canonicalize(source_root).map_err(|e| ForjaError::FileReadError {
                path: source_root.to_path_buf(),
                error: e.to_string(),
            })?;

        Ok(Self {
            source_root,
            alias_root: alias_root.to_path_buf(),
            alias_prefix: alias_prefix.to_string(),
            provided: HashSet::new(),
        })
    }

    /// Create a resolver from engine configuration
    pub fn from_config(config: &ForjaConfig) -> ForjaResult<Self> {
        Self::new(
            &config.source_root,
            &config.layout.alias_prefix,
            &config.layout.alias_root,
        )
    }

    /// Mark paths as supplied by the generated project
    ///
    /// Imports resolving to one of these are satisfied without copying, so a
    /// platform file never overwrites a generated one.
    pub fn with_provided(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.provided.extend(paths);
        self
    }

    /// Traverse from `entries` without writing anything
    pub async fn plan(&self, entries: &[PathBuf]) -> ForjaResult<Closure> {
        self.walk(entries, None).await
    }

    /// Traverse from `entries`, copying every reached file under `target`
    pub async fn copy_into(&self, entries: &[PathBuf], target: &Path) -> ForjaResult<Closure> {
        self.walk(entries, Some(target)).await
    }

    /// Resolve an entry point given relative to the source root
    pub async fn resolve_entry(&self, logical: &Path) -> ForjaResult<PathBuf> {
        let base = self.source_root.join(logical);
        match self.resolve_candidates(&base).await? {
            Resolution::File(path) => Ok(path),
            Resolution::Provided | Resolution::Missing => Err(ForjaError::EntryPointNotFound {
                path: logical.to_path_buf(),
            }),
        }
    }

    async fn walk(&self, entries: &[PathBuf], target: Option<&Path>) -> ForjaResult<Closure> {
        let mut closure = Closure::default();
        let mut visited: HashSet<PathBuf> = HashSet::new();
        // Case-folded destination -> source, to catch two files landing on one path
        let mut destinations: HashMap<String, PathBuf> = HashMap::new();

        let mut stack = Vec::with_capacity(entries.len());
        for entry in entries {
            stack.push(self.resolve_entry(entry).await?);
        }
        stack.reverse();

        while let Some(path) = stack.pop() {
            if !visited.insert(path.clone()) {
                continue;
            }

            let relative = path
                .strip_prefix(&self.source_root)
                .map(Path::to_path_buf)
                .map_err(|_| ForjaError::EntryPointNotFound { path: path.clone() })?;

            let folded = relative.to_string_lossy().to_lowercase();
            if let Some(first) = destinations.get(&folded) {
                return Err(ForjaError::DestinationCollision {
                    destination: relative,
                    first: first.clone(),
                    second: path,
                });
            }
            destinations.insert(folded, path.clone());

            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| ForjaError::FileReadError {
                    path: path.clone(),
                    error: e.to_string(),
                })?;

            if let Some(target) = target {
                copy_verbatim(&bytes, &target.join(&relative)).await?;
            }

            let text = String::from_utf8_lossy(&bytes);
            let mut next = Vec::new();
            for specifier in scan_imports(&text) {
                match classify(specifier, &self.alias_prefix) {
                    ImportKind::Alias(rest) => match self.resolve_alias(rest).await? {
                        Resolution::File(found) => next.push(found),
                        Resolution::Provided => {}
                        Resolution::Missing => {
                            tracing::warn!(
                                from = %relative.display(),
                                specifier,
                                "unresolved import skipped"
                            );
                            closure.unresolved.push(UnresolvedImport {
                                from: relative.clone(),
                                specifier: specifier.to_string(),
                            });
                        }
                    },
                    ImportKind::Package(name) => {
                        closure.packages.insert(name);
                    }
                    ImportKind::Relative(_) | ImportKind::Other(_) => {}
                }
            }

            tracing::debug!(path = %relative.display(), imports = next.len(), "visited");
            closure.files.push(relative);

            // Reverse so imports are visited in source order
            stack.extend(next.into_iter().rev().filter(|p| !visited.contains(p)));
        }

        Ok(closure)
    }

    async fn resolve_alias(&self, rest: &str) -> ForjaResult<Resolution> {
        let logical = self.alias_root.join(rest);
        if escapes_root(&logical) {
            return Ok(Resolution::Missing);
        }

        let base = self.source_root.join(&logical);
        self.resolve_candidates(&base).await
    }

    async fn resolve_candidates(&self, base: &Path) -> ForjaResult<Resolution> {
        let base = base.to_string_lossy();

        for suffix in RESOLVE_SUFFIXES {
            let candidate = PathBuf::from(format!("{}{}", base, suffix));

            if let Ok(relative) = candidate.strip_prefix(&self.source_root) {
                if self.provided.contains(relative) {
                    return Ok(Resolution::Provided);
                }
            }

            match tokio::fs::metadata(&candidate).await {
                Ok(meta) if meta.is_file() => {
                    let canonical = tokio::fs::canonicalize(&candidate).await?;
                    if !canonical.starts_with(&self.source_root) {
                        tracing::warn!(path = %candidate.display(), "import resolves outside the source root");
                        return Ok(Resolution::Missing);
                    }
                    return Ok(Resolution::File(canonical));
                }
                _ => continue,
            }
        }

        Ok(Resolution::Missing)
    }
}

/// Entry points for a draft, relative to the source root
///
/// The dispatcher, each distinct section, and the enabled header/footer.
pub fn entry_points(layout: &LayoutConfig, draft: &ValidatedDraft) -> Vec<PathBuf> {
    let mut entries = vec![layout.dispatcher.clone()];
    entries.extend(
        draft
            .section_names()
            .into_iter()
            .map(|name| layout.sections_dir.join(name)),
    );
    if let Some(header) = &draft.header {
        entries.push(layout.headers_dir.join(header));
    }
    if let Some(footer) = &draft.footer {
        entries.push(layout.footers_dir.join(footer));
    }
    entries
}

fn escapes_root(path: &Path) -> bool {
    let mut depth: i32 = 0;
    for component in path.components() {
        match component {
            Component::ParentDir => depth -= 1,
            Component::Normal(_) => depth += 1,
            Component::RootDir | Component::Prefix(_) => return true,
            Component::CurDir => {}
        }
        if depth < 0 {
            return true;
        }
    }
    false
}

async fn copy_verbatim(bytes: &[u8], destination: &Path) -> ForjaResult<()> {
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ForjaError::FileWriteError {
                path: parent.to_path_buf(),
                error: e.to_string(),
            })?;
    }

    tokio::fs::write(destination, bytes)
        .await
        .map_err(|e| ForjaError::FileWriteError {
            path: destination.to_path_buf(),
            error: e.to_string(),
        })
}
