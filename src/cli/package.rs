// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Package command - run the full pipeline for one draft

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use crate::builder::{ShellToolchain, Toolchain};
use crate::config::ForjaConfig;
use crate::draft::CampaignDraft;
use crate::pipeline::{BuildPipeline, PipelineResult};
use crate::utils::create_spinner;

/// Run the package command
pub async fn run(draft_path: PathBuf, config_path: Option<PathBuf>, verbose: bool) -> Result<()> {
    let config = ForjaConfig::load(config_path.as_deref())?;
    let draft = CampaignDraft::from_file(&draft_path)?;

    let toolchain = ShellToolchain::from_config(&config.build);
    if !toolchain.check_available().await? {
        eprintln!("{}", "Build shell is not available:".red().bold());
        eprintln!("  {} {}", "✗".red(), config.build.shell);
        return Err(miette::miette!("Required tools are not installed"));
    }

    if verbose {
        println!("  {} {}", "Source:".bold(), config.source_root.display());
        println!("  {} {}", "Build:".bold(), toolchain.describe());
        println!();
    }

    let pipeline = BuildPipeline::from_config(&config);

    let spinner = create_spinner("Packaging campaign...");
    let result = pipeline.run(&draft).await;
    spinner.finish_and_clear();

    match result? {
        PipelineResult::Success {
            artifact_url,
            archive_size,
            tasks,
        } => {
            if verbose {
                for task in &tasks {
                    println!(
                        "  {} {} ({:.2}s)",
                        "✓".green(),
                        task.name.bold(),
                        task.duration.as_secs_f64()
                    );
                }
                println!();
            }

            println!("{}", "Campaign packaged successfully".green());
            if let Some(size) = archive_size {
                println!("  {} {} bytes", "Size:".bold(), size);
            }
            if let Some(url) = artifact_url {
                println!("  {} {}", "Artifact:".bold(), url.cyan());
            }
            Ok(())
        }
        PipelineResult::Failure {
            task,
            reason,
            tasks,
        } => {
            for report in tasks.iter().filter(|t| t.succeeded) {
                println!("  {} {}", "✓".green(), report.name);
            }
            eprintln!("  {} {} - {}", "✗".red(), task.bold(), reason);
            eprintln!();
            eprintln!("{}", "See the log output above for details.".dimmed());
            Err(miette::miette!("Packaging failed: {}", reason))
        }
    }
}
