// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Build context
//!
//! The one piece of mutable state a packaging run has. It is created by
//! [`BuildPipeline::run`](super::BuildPipeline::run) and handed to each task
//! in turn.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::draft::ValidatedDraft;

/// State threaded through every task of a run
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Correlation id for every log event of this run
    pub trace_id: String,

    /// Draft being packaged
    pub draft: ValidatedDraft,

    /// Per-run project directory, `<scratch_root>/forja-<draftId>`
    pub temp_dir: PathBuf,

    /// Where the external build writes its output
    pub build_dir: PathBuf,

    /// Archive location, a sibling of `temp_dir`
    pub archive_path: PathBuf,

    /// Generated files, relative to `temp_dir`
    pub generated_files: Vec<PathBuf>,

    /// Copied source files, relative to `temp_dir`
    pub copied_files: Vec<PathBuf>,

    /// Third-party packages imported by copied files
    pub external_packages: BTreeSet<String>,

    /// Archive size in bytes, once packaged
    pub archive_size: Option<u64>,

    /// Public URL, once uploaded
    pub artifact_url: Option<String>,

    /// Whether this run created `temp_dir`
    pub owns_temp_dir: bool,
}

impl BuildContext {
    /// Create a context for `draft` with a fresh trace id
    pub fn new(draft: ValidatedDraft, scratch_root: &Path, output_dir: &Path) -> Self {
        Self::with_trace_id(uuid::Uuid::new_v4().to_string(), draft, scratch_root, output_dir)
    }

    /// Create a context with a caller-supplied trace id
    pub fn with_trace_id(
        trace_id: String,
        draft: ValidatedDraft,
        scratch_root: &Path,
        output_dir: &Path,
    ) -> Self {
        let temp_dir = scratch_root.join(format!("forja-{}", draft.id));
        let build_dir = temp_dir.join(output_dir);
        let archive_path = scratch_root.join(format!("forja-{}.zip", draft.id));

        Self {
            trace_id,
            draft,
            temp_dir,
            build_dir,
            archive_path,
            generated_files: Vec::new(),
            copied_files: Vec::new(),
            external_packages: BTreeSet::new(),
            archive_size: None,
            artifact_url: None,
            owns_temp_dir: false,
        }
    }

    /// Record generated files, skipping paths already recorded
    pub fn record_generated(&mut self, paths: impl IntoIterator<Item = PathBuf>) {
        for path in paths {
            if !self.generated_files.contains(&path) {
                self.generated_files.push(path);
            }
        }
    }
}
