// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Build pipeline
//!
//! A fixed linear chain of tasks turns a draft into an uploaded archive:
//! setup, manifest, sources, component copy, build, package, upload, with
//! cleanup run after whichever task finished last.

mod context;
mod executor;
mod task;
pub mod tasks;

pub use context::BuildContext;
pub use executor::{BuildPipeline, PipelineResult, TaskReport};
pub use task::Task;
