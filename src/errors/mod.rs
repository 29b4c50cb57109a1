// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Error types for the packaging engine
//!
//! Every failure carries enough detail for an operator to diagnose it from the
//! logs, while [`ForjaError::user_message`] gives the short, end-user safe
//! reason surfaced in a pipeline result.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for forja operations
pub type ForjaResult<T> = Result<T, ForjaError>;

/// Main error type for forja
#[derive(Error, Debug, Diagnostic)]
pub enum ForjaError {
    // ─────────────────────────────────────────────────────────────────────────
    // Contract Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Draft has no identifier")]
    #[diagnostic(
        code(forja::missing_draft_id),
        help("A draft identifier is required to name the scratch directory and the artifact")
    )]
    MissingDraftId,

    #[error("Invalid draft: {reason}")]
    #[diagnostic(code(forja::invalid_draft))]
    InvalidDraft { reason: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(forja::config_not_found),
        help("Print the defaults with 'forja config' and save them to a file")
    )]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid configuration: {reason}")]
    #[diagnostic(code(forja::invalid_config))]
    InvalidConfig { reason: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Generation Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to generate '{file}': {reason}")]
    #[diagnostic(code(forja::generation_failed))]
    Generation { file: String, reason: String },

    #[error("Theme fragment '{kind}/{preset}' not found")]
    #[diagnostic(
        code(forja::theme_fragment_not_found),
        help("Check that the theme store holds a '{preset}' preset for '{kind}'")
    )]
    ThemeFragmentNotFound { kind: String, preset: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Resolution Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Entry point not found: {path}")]
    #[diagnostic(
        code(forja::entry_point_not_found),
        help("Every section and enabled header/footer must have a component file in the source tree")
    )]
    EntryPointNotFound { path: PathBuf },

    #[error("Files '{first}' and '{second}' would both be copied to '{destination}'")]
    #[diagnostic(
        code(forja::destination_collision),
        help("Rename one of the files; destinations are compared case-insensitively")
    )]
    DestinationCollision {
        destination: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Build Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to start build command '{program}': {error}")]
    #[diagnostic(code(forja::build_spawn_failed))]
    BuildSpawnFailed {
        program: String,
        error: String,
        #[help]
        help: Option<String>,
    },

    #[error("Build exited with {}:\n{stderr}", describe_exit(.exit_code))]
    #[diagnostic(code(forja::build_failed))]
    BuildFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Build did not finish within {seconds}s")]
    #[diagnostic(
        code(forja::build_timed_out),
        help("Raise build.timeout_secs if the toolchain legitimately needs longer")
    )]
    BuildTimedOut { seconds: u64 },

    #[error("Build finished but produced no output at {path}")]
    #[diagnostic(
        code(forja::build_output_missing),
        help("Check that build.output_dir matches the framework's export directory")
    )]
    BuildOutputMissing { path: PathBuf },

    // ─────────────────────────────────────────────────────────────────────────
    // Packaging/Upload Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Packaging failed: {message}")]
    #[diagnostic(code(forja::packaging_failed))]
    Packaging { message: String },

    #[error("Upload of '{key}' failed: {message}")]
    #[diagnostic(code(forja::upload_failed))]
    Upload { key: String, message: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Scratch directory already exists: {path}")]
    #[diagnostic(
        code(forja::scratch_in_use),
        help("Another packaging run for this draft is in flight, or a previous run was killed before cleanup")
    )]
    ScratchInUse { path: PathBuf },

    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(forja::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(forja::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(forja::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(forja::yaml_error))]
    Yaml { message: String },

    #[error("JSON parsing error: {message}")]
    #[diagnostic(code(forja::json_error))]
    Json { message: String },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

impl From<std::io::Error> for ForjaError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for ForjaError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for ForjaError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl From<zip::result::ZipError> for ForjaError {
    fn from(e: zip::result::ZipError) -> Self {
        Self::Packaging { message: e.to_string() }
    }
}

impl From<walkdir::Error> for ForjaError {
    fn from(e: walkdir::Error) -> Self {
        Self::Packaging { message: e.to_string() }
    }
}

impl ForjaError {
    /// Create a spawn error with an installation hint for well-known toolchains
    pub fn build_spawn_failed(program: &str, error: impl ToString) -> Self {
        let help = match program {
            "npm" | "npx" | "node" => {
                Some("Install Node.js and ensure npm is in your PATH".to_string())
            }
            "pnpm" => Some("Install pnpm: https://pnpm.io/installation".to_string()),
            _ => None,
        };

        Self::BuildSpawnFailed {
            program: program.to_string(),
            error: error.to_string(),
            help,
        }
    }

    /// Create a generation error for a specific output file
    pub fn generation(file: &str, reason: impl Into<String>) -> Self {
        Self::Generation {
            file: file.to_string(),
            reason: reason.into(),
        }
    }

    /// Short reason safe to show to end users
    ///
    /// Internal details (paths, stderr, toolchain output) stay in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingDraftId => "draft has no identifier",
            Self::InvalidDraft { .. } => "draft is invalid",
            Self::ConfigNotFound { .. } | Self::InvalidConfig { .. } => {
                "packaging engine is misconfigured"
            }
            Self::Generation { .. } | Self::ThemeFragmentNotFound { .. } => {
                "project generation failed"
            }
            Self::EntryPointNotFound { .. } | Self::DestinationCollision { .. } => {
                "component resolution failed"
            }
            Self::BuildSpawnFailed { .. }
            | Self::BuildFailed { .. }
            | Self::BuildOutputMissing { .. } => "build failed",
            Self::BuildTimedOut { .. } => "build failed: timed out",
            Self::Packaging { .. } => "packaging failed",
            Self::Upload { .. } => "upload failed",
            Self::ScratchInUse { .. } => "a packaging run for this draft is already in progress",
            Self::FileReadError { .. }
            | Self::FileWriteError { .. }
            | Self::Io { .. }
            | Self::Yaml { .. }
            | Self::Json { .. } => "packaging failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_failure_message_is_short() {
        let err = ForjaError::BuildFailed {
            exit_code: Some(1),
            stderr: "Type error: Property 'x' does not exist".into(),
        };

        assert_eq!(err.user_message(), "build failed");
        assert!(err.to_string().contains("status 1"));
        assert!(err.to_string().contains("Property 'x'"));
    }

    #[test]
    fn test_timeout_reason_is_distinct() {
        let err = ForjaError::BuildTimedOut { seconds: 5 };
        assert_eq!(err.user_message(), "build failed: timed out");
        assert!(err.to_string().contains("5s"));
    }

    #[test]
    fn test_spawn_failure_help() {
        let ForjaError::BuildSpawnFailed { help, .. } =
            ForjaError::build_spawn_failed("npm", "No such file or directory")
        else {
            panic!("expected spawn failure");
        };
        assert!(help.unwrap().contains("Node.js"));
    }
}
