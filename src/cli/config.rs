// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Config command - print the effective configuration

use miette::Result;
use std::path::PathBuf;

use crate::config::ForjaConfig;

/// Run the config command
pub async fn run(config_path: Option<PathBuf>) -> Result<()> {
    let config = ForjaConfig::load(config_path.as_deref())?;
    print!("{}", config.to_yaml()?);
    Ok(())
}
