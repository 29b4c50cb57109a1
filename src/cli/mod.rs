// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! CLI command definitions and handlers
//!
//! The operator harness around the packaging library.

pub mod config;
pub mod deps;
pub mod package;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Campaign packaging engine
///
/// Turn a campaign draft into a standalone, buildable web project archive.
#[derive(Parser, Debug)]
#[clap(
    name = "forja",
    version,
    about = "Package campaign drafts into standalone web project archives",
    long_about = None,
    after_help = "Examples:\n\
        forja package draft.json        Build and publish a campaign archive\n\
        forja deps draft.json           Show which components a draft pulls in\n\
        forja config                    Print the effective configuration\n\n\
        See 'forja <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./forja.yaml when present)
    #[clap(short, long, global = true, value_name = "FILE", env = "FORJA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full packaging pipeline for a draft
    Package {
        /// Draft JSON file
        draft: PathBuf,
    },

    /// Show the component closure of a draft without building
    Deps {
        /// Draft JSON file
        draft: PathBuf,

        /// Output format
        #[clap(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the effective configuration as YAML
    Config,
}

/// Output format for inspection commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
