// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! # forja - Campaign Packaging Engine
//!
//! `forja` turns a campaign draft into a standalone, buildable web project,
//! compiles it and publishes the result as a single archive.
//!
//! ## Features
//!
//! - **Code generation** - Manifest, layout, page, styles, theme module and build configs
//! - **Component copying** - Only the source files the draft actually reaches
//! - **Programmatic build** - External toolchain behind a trait, bounded by a timeout
//! - **Packaging** - Deterministic zip archives published through a sink
//!
//! ## Quick Start
//!
//! ```bash
//! # Show which components a draft pulls in
//! forja deps draft.json
//!
//! # Build and publish the archive
//! forja package draft.json
//! ```
//!
//! As a library:
//!
//! ```no_run
//! use forja::{BuildPipeline, CampaignDraft, ForjaConfig};
//!
//! # async fn demo() -> forja::ForjaResult<()> {
//! let config = ForjaConfig::load(None)?;
//! let draft = CampaignDraft::from_file(std::path::Path::new("draft.json"))?;
//! let result = BuildPipeline::from_config(&config).run(&draft).await?;
//! println!("{:?}", result);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod cli;
pub mod config;
pub mod draft;
pub mod errors;
pub mod generators;
pub mod packager;
pub mod pipeline;
pub mod resolver;
pub mod theme;
pub mod upload;
pub mod utils;

// Re-export commonly used types
pub use config::ForjaConfig;
pub use draft::{CampaignDraft, DraftValidator, ValidatedDraft};
pub use errors::{ForjaError, ForjaResult};
pub use pipeline::{BuildContext, BuildPipeline, PipelineResult, Task, TaskReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
