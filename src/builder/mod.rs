// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Programmatic builder
//!
//! The external framework build is reached only through the [`Toolchain`]
//! trait, so the command can change without touching the pipeline.

mod shell;

pub use shell::ShellToolchain;

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use crate::errors::ForjaResult;

/// Outcome of a successful build
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Exit code (always 0 for a returned output)
    pub exit_code: i32,

    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,

    /// Wall-clock duration
    pub duration: Duration,
}

/// Trait for build toolchains
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Build the project at `project_root`
    ///
    /// # Arguments
    /// * `project_root` - Generated project directory, used as working directory
    /// * `trace_id` - Correlation id attached to every forwarded output line
    async fn build(&self, project_root: &Path, trace_id: &str) -> ForjaResult<BuildOutput>;

    /// Human-readable description of what `build` runs
    fn describe(&self) -> String;

    /// Check if the toolchain can be started
    async fn check_available(&self) -> ForjaResult<bool>;
}
