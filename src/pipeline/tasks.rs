// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! The standard packaging tasks

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use super::{BuildContext, Task};
use crate::builder::Toolchain;
use crate::config::{BuildConfig, LayoutConfig, ManifestConfig, PackageConfig, PackageSource};
use crate::errors::{ForjaError, ForjaResult};
use crate::generators::{
    self, generate_build_configs, generate_manifest, generate_root_layout, generate_root_page,
    generate_stylesheet, generate_theme_entrypoint, uncatalogued_packages, GeneratedFile,
};
use crate::packager::package_directory;
use crate::resolver::{entry_points, DependencyResolver};
use crate::theme::{ResolvedTheme, ThemeStore};
use crate::upload::{artifact_key, ArtifactSink};

/// Write generated files into the project and record them on the context
async fn emit(ctx: &mut BuildContext, files: &[GeneratedFile]) -> ForjaResult<()> {
    generators::write_all(&ctx.temp_dir, files).await?;
    ctx.record_generated(files.iter().map(|f| f.path.clone()));
    Ok(())
}

/// Create the per-run scratch directory
pub struct SetupDirectories;

#[async_trait]
impl Task for SetupDirectories {
    fn name(&self) -> &str {
        "setup-directories"
    }

    async fn execute(&self, ctx: &mut BuildContext) -> ForjaResult<()> {
        if let Some(scratch_root) = ctx.temp_dir.parent() {
            tokio::fs::create_dir_all(scratch_root)
                .await
                .map_err(|e| ForjaError::FileWriteError {
                    path: scratch_root.to_path_buf(),
                    error: e.to_string(),
                })?;
        }

        // Non-recursive: an existing directory belongs to another run
        match tokio::fs::create_dir(&ctx.temp_dir).await {
            Ok(()) => ctx.owns_temp_dir = true,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(ForjaError::ScratchInUse {
                    path: ctx.temp_dir.clone(),
                });
            }
            Err(e) => {
                return Err(ForjaError::FileWriteError {
                    path: ctx.temp_dir.clone(),
                    error: e.to_string(),
                });
            }
        }

        tracing::debug!(path = %ctx.temp_dir.display(), "scratch directory created");
        Ok(())
    }
}

/// Write the initial package manifest
pub struct GenerateManifest {
    manifest: ManifestConfig,
}

impl GenerateManifest {
    pub fn new(manifest: ManifestConfig) -> Self {
        Self { manifest }
    }
}

#[async_trait]
impl Task for GenerateManifest {
    fn name(&self) -> &str {
        "generate-manifest"
    }

    async fn execute(&self, ctx: &mut BuildContext) -> ForjaResult<()> {
        let file = generate_manifest(&ctx.draft, &self.manifest, &BTreeSet::new())?;
        emit(ctx, &[file]).await
    }
}

/// Generate page, layout, styles, theme entry point and build configuration
pub struct GenerateSources {
    layout: LayoutConfig,
    build: BuildConfig,
    themes: Arc<dyn ThemeStore>,
}

impl GenerateSources {
    pub fn new(layout: LayoutConfig, build: BuildConfig, themes: Arc<dyn ThemeStore>) -> Self {
        Self {
            layout,
            build,
            themes,
        }
    }
}

#[async_trait]
impl Task for GenerateSources {
    fn name(&self) -> &str {
        "generate-sources"
    }

    async fn execute(&self, ctx: &mut BuildContext) -> ForjaResult<()> {
        let theme = ResolvedTheme::load(self.themes.as_ref(), &ctx.draft.theme).await?;
        tracing::debug!(tokens = theme.tokens.len(), "theme resolved");

        let mut files = vec![
            generate_root_layout(&ctx.draft, &theme, &self.layout),
            generate_root_page(&ctx.draft, &self.layout)?,
            generate_stylesheet(&theme),
            generate_theme_entrypoint(&ctx.draft.id, &theme, &self.layout)?,
        ];
        files.extend(generate_build_configs(&ctx.draft.id, &theme, &self.layout, &self.build)?);

        emit(ctx, &files).await
    }
}

/// Copy the component closure from the source tree and refresh the manifest
pub struct CopyDependencies {
    source_root: PathBuf,
    layout: LayoutConfig,
    manifest: ManifestConfig,
}

impl CopyDependencies {
    pub fn new(source_root: PathBuf, layout: LayoutConfig, manifest: ManifestConfig) -> Self {
        Self {
            source_root,
            layout,
            manifest,
        }
    }
}

#[async_trait]
impl Task for CopyDependencies {
    fn name(&self) -> &str {
        "copy-dependencies"
    }

    async fn execute(&self, ctx: &mut BuildContext) -> ForjaResult<()> {
        let resolver = DependencyResolver::new(
            &self.source_root,
            &self.layout.alias_prefix,
            &self.layout.alias_root,
        )?
        .with_provided(ctx.generated_files.iter().cloned());

        let entries = entry_points(&self.layout, &ctx.draft);
        let closure = resolver.copy_into(&entries, &ctx.temp_dir).await?;

        tracing::info!(
            files = closure.files.len(),
            packages = closure.packages.len(),
            unresolved = closure.unresolved.len(),
            "component closure copied"
        );

        for package in uncatalogued_packages(&self.manifest, &closure.packages) {
            tracing::warn!(package = %package, "imported package has no catalog version, omitted from manifest");
        }

        let manifest = generate_manifest(&ctx.draft, &self.manifest, &closure.packages)?;
        emit(ctx, &[manifest]).await?;

        ctx.copied_files = closure.files;
        ctx.external_packages = closure.packages;
        Ok(())
    }
}

/// Run the external build in the generated project
pub struct RunBuild {
    toolchain: Arc<dyn Toolchain>,
}

impl RunBuild {
    pub fn new(toolchain: Arc<dyn Toolchain>) -> Self {
        Self { toolchain }
    }
}

#[async_trait]
impl Task for RunBuild {
    fn name(&self) -> &str {
        "run-build"
    }

    async fn execute(&self, ctx: &mut BuildContext) -> ForjaResult<()> {
        tracing::debug!(toolchain = %self.toolchain.describe(), "running build");
        let output = self.toolchain.build(&ctx.temp_dir, &ctx.trace_id).await?;

        let has_output = tokio::fs::metadata(&ctx.build_dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !has_output {
            return Err(ForjaError::BuildOutputMissing {
                path: ctx.build_dir.clone(),
            });
        }

        tracing::info!(duration_secs = output.duration.as_secs_f64(), "build output ready");
        Ok(())
    }
}

/// Zip the project (or only its build output)
pub struct PackageArtifact {
    package: PackageConfig,
}

impl PackageArtifact {
    pub fn new(package: PackageConfig) -> Self {
        Self { package }
    }
}

#[async_trait]
impl Task for PackageArtifact {
    fn name(&self) -> &str {
        "package-artifact"
    }

    async fn execute(&self, ctx: &mut BuildContext) -> ForjaResult<()> {
        let size = match self.package.source {
            PackageSource::Project => {
                package_directory(&ctx.temp_dir, &ctx.archive_path, &self.package.exclude).await?
            }
            PackageSource::BuildOutput => {
                package_directory(&ctx.build_dir, &ctx.archive_path, &[]).await?
            }
        };

        ctx.archive_size = Some(size);
        Ok(())
    }
}

/// Publish the archive through the artifact sink
pub struct UploadArtifact {
    sink: Arc<dyn ArtifactSink>,
    key_prefix: String,
}

impl UploadArtifact {
    pub fn new(sink: Arc<dyn ArtifactSink>, key_prefix: impl Into<String>) -> Self {
        Self {
            sink,
            key_prefix: key_prefix.into(),
        }
    }
}

#[async_trait]
impl Task for UploadArtifact {
    fn name(&self) -> &str {
        "upload-artifact"
    }

    async fn execute(&self, ctx: &mut BuildContext) -> ForjaResult<()> {
        let bytes = tokio::fs::read(&ctx.archive_path)
            .await
            .map_err(|e| ForjaError::FileReadError {
                path: ctx.archive_path.clone(),
                error: e.to_string(),
            })?;

        let key = artifact_key(&self.key_prefix, &ctx.draft, &bytes);
        let url = self.sink.upload(bytes, &key).await?;

        tracing::info!(key = %key, url = %url, "artifact uploaded");
        ctx.artifact_url = Some(url);
        Ok(())
    }
}

/// Remove everything this run put in the scratch root
///
/// Never fails; problems are logged. Nothing is touched when the run did not
/// create its scratch directory, since it then belongs to another run.
pub async fn cleanup(ctx: &BuildContext) {
    if !ctx.owns_temp_dir {
        return;
    }

    match tokio::fs::remove_dir_all(&ctx.temp_dir).await {
        Ok(()) => tracing::debug!(path = %ctx.temp_dir.display(), "scratch directory removed"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %ctx.temp_dir.display(), error = %e, "failed to remove scratch directory")
        }
    }

    match tokio::fs::remove_file(&ctx.archive_path).await {
        Ok(()) => tracing::debug!(path = %ctx.archive_path.display(), "archive removed"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %ctx.archive_path.display(), error = %e, "failed to remove archive")
        }
    }
}

/// Removes the scratch state if a run is dropped before [`cleanup`] gets to
/// run, e.g. when the caller cancels the future mid-build
pub(crate) struct ScratchGuard {
    temp_dir: PathBuf,
    archive_path: PathBuf,
    armed: bool,
}

impl ScratchGuard {
    pub(crate) fn new(ctx: &BuildContext) -> Self {
        Self {
            temp_dir: ctx.temp_dir.clone(),
            archive_path: ctx.archive_path.clone(),
            armed: false,
        }
    }

    /// Track whether the run currently owns the scratch directory
    pub(crate) fn track(&mut self, ctx: &BuildContext) {
        self.armed = ctx.owns_temp_dir;
    }

    pub(crate) fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for ScratchGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        tracing::warn!(path = %self.temp_dir.display(), "packaging run dropped, removing scratch state");
        if let Err(e) = std::fs::remove_dir_all(&self.temp_dir) {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(path = %self.temp_dir.display(), error = %e, "failed to remove scratch directory");
            }
        }
        if let Err(e) = std::fs::remove_file(&self.archive_path) {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(path = %self.archive_path.display(), error = %e, "failed to remove archive");
            }
        }
    }
}
