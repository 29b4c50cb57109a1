// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Deps command - show the component closure of a draft

use colored::Colorize;
use miette::Result;
use serde_json::json;
use std::path::PathBuf;

use super::OutputFormat;
use crate::config::ForjaConfig;
use crate::draft::{CampaignDraft, DraftValidator};
use crate::generators::{theme_entrypoint_path, uncatalogued_packages};
use crate::resolver::{entry_points, DependencyResolver};

/// Run the deps command
pub async fn run(
    draft_path: PathBuf,
    format: OutputFormat,
    config_path: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let config = ForjaConfig::load(config_path.as_deref())?;
    let draft = DraftValidator::validate(&CampaignDraft::from_file(&draft_path)?)?;

    // Theme entry point is generated, never copied
    let resolver = DependencyResolver::from_config(&config)?
        .with_provided([theme_entrypoint_path(&config.layout)]);
    let entries = entry_points(&config.layout, &draft);
    let closure = resolver.plan(&entries).await?;
    let uncatalogued = uncatalogued_packages(&config.manifest, &closure.packages);

    match format {
        OutputFormat::Json => {
            let output = json!({
                "draftId": draft.id,
                "entryPoints": entries,
                "files": closure.files,
                "packages": closure.packages,
                "uncatalogued": uncatalogued,
                "unresolved": closure.unresolved.iter().map(|u| json!({
                    "from": u.from,
                    "specifier": u.specifier,
                })).collect::<Vec<_>>(),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&output).map_err(|e| miette::miette!("{}", e))?
            );
        }
        OutputFormat::Text => {
            println!("{} {}", "Draft".bold(), draft.id.cyan());
            println!();

            if verbose {
                println!("{}:", "Entry points".bold());
                for entry in &entries {
                    println!("  - {}", entry.display());
                }
                println!();
            }

            println!("{} ({}):", "Files".bold(), closure.files.len());
            for file in &closure.files {
                println!("  - {}", file.display());
            }

            println!();
            println!("{} ({}):", "Packages".bold(), closure.packages.len());
            for package in &closure.packages {
                if uncatalogued.contains(package) {
                    println!("  - {} {}", package, "(not in catalog)".yellow());
                } else {
                    println!("  - {}", package);
                }
            }

            if !closure.unresolved.is_empty() {
                println!();
                println!("{}:", "Unresolved imports".yellow().bold());
                for import in &closure.unresolved {
                    println!(
                        "  {} {} {}",
                        "⚠".yellow(),
                        import.specifier,
                        format!("(from {})", import.from.display()).dimmed()
                    );
                }
            }
        }
    }

    Ok(())
}
