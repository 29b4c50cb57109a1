// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Pipeline executor
//!
//! Runs tasks strictly in order against one [`BuildContext`], stops at the
//! first failure and always cleans up afterwards.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::Instrument;

use super::tasks::{
    cleanup, CopyDependencies, ScratchGuard, GenerateManifest, GenerateSources, PackageArtifact, RunBuild,
    SetupDirectories, UploadArtifact,
};
use super::{BuildContext, Task};
use crate::builder::{ShellToolchain, Toolchain};
use crate::config::ForjaConfig;
use crate::draft::{CampaignDraft, DraftValidator};
use crate::errors::ForjaResult;
use crate::theme::{DirectoryThemeStore, ThemeStore};
use crate::upload::{ArtifactSink, FilesystemSink};

/// Timing and outcome of one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub name: String,
    pub duration: Duration,
    pub succeeded: bool,
}

/// Outcome of a packaging run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineResult {
    /// Every task succeeded
    Success {
        /// Public URL of the archive, when the run uploaded one
        artifact_url: Option<String>,
        /// Archive size in bytes, when the run packaged one
        archive_size: Option<u64>,
        tasks: Vec<TaskReport>,
    },
    /// A task failed and the run stopped there
    Failure {
        /// Name of the failing task
        task: String,
        /// Short operator-safe reason
        reason: String,
        tasks: Vec<TaskReport>,
    },
}

impl PipelineResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn tasks(&self) -> &[TaskReport] {
        match self {
            Self::Success { tasks, .. } | Self::Failure { tasks, .. } => tasks,
        }
    }
}

/// Linear packaging pipeline
pub struct BuildPipeline {
    scratch_root: PathBuf,
    output_dir: PathBuf,
    tasks: Vec<Box<dyn Task>>,
}

impl BuildPipeline {
    /// Create a pipeline from an arbitrary task list
    pub fn new(scratch_root: PathBuf, output_dir: PathBuf, tasks: Vec<Box<dyn Task>>) -> Self {
        Self {
            scratch_root,
            output_dir,
            tasks,
        }
    }

    /// The standard task chain with the given collaborators
    pub fn standard(
        config: &ForjaConfig,
        toolchain: Arc<dyn Toolchain>,
        sink: Arc<dyn ArtifactSink>,
        themes: Arc<dyn ThemeStore>,
    ) -> Self {
        let tasks: Vec<Box<dyn Task>> = vec![
            Box::new(SetupDirectories),
            Box::new(GenerateManifest::new(config.manifest.clone())),
            Box::new(GenerateSources::new(
                config.layout.clone(),
                config.build.clone(),
                themes,
            )),
            Box::new(CopyDependencies::new(
                config.source_root.clone(),
                config.layout.clone(),
                config.manifest.clone(),
            )),
            Box::new(RunBuild::new(toolchain)),
            Box::new(PackageArtifact::new(config.package.clone())),
            Box::new(UploadArtifact::new(sink, config.upload.key_prefix.clone())),
        ];

        Self::new(
            config.scratch_root.clone(),
            config.build.output_dir.clone(),
            tasks,
        )
    }

    /// The standard task chain: shell build, filesystem sink, theme
    /// fragments from the source tree
    pub fn from_config(config: &ForjaConfig) -> Self {
        let themes = DirectoryThemeStore::new(config.source_root.join(&config.layout.theme_dir));

        Self::standard(
            config,
            Arc::new(ShellToolchain::from_config(&config.build)),
            Arc::new(FilesystemSink::from_config(&config.upload)),
            Arc::new(themes),
        )
    }

    /// Task names in execution order
    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    /// Validate `draft` and run every task
    ///
    /// Contract violations are returned as errors before anything touches the
    /// filesystem. Once tasks start, every outcome is a [`PipelineResult`].
    pub async fn run(&self, draft: &CampaignDraft) -> ForjaResult<PipelineResult> {
        let draft = DraftValidator::validate(draft)?;
        let ctx = BuildContext::new(draft, &self.scratch_root, &self.output_dir);
        Ok(self.run_context(ctx).await)
    }

    /// Run every task against a prepared context
    pub async fn run_context(&self, mut ctx: BuildContext) -> PipelineResult {
        let span = tracing::info_span!(
            "packaging",
            trace_id = %ctx.trace_id,
            draft_id = %ctx.draft.id
        );

        async move {
            let start = Instant::now();
            let mut guard = ScratchGuard::new(&ctx);
            let result = self.execute_tasks(&mut ctx, &mut guard).await;
            cleanup(&ctx).await;
            guard.disarm();

            match &result {
                PipelineResult::Success { .. } => tracing::info!(
                    duration_secs = start.elapsed().as_secs_f64(),
                    "packaging completed"
                ),
                PipelineResult::Failure { task, reason, .. } => tracing::error!(
                    task = %task,
                    reason = %reason,
                    duration_secs = start.elapsed().as_secs_f64(),
                    "packaging failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn execute_tasks(&self, ctx: &mut BuildContext, guard: &mut ScratchGuard) -> PipelineResult {
        let mut reports = Vec::with_capacity(self.tasks.len());

        for task in &self.tasks {
            let name = task.name();
            let start = Instant::now();
            tracing::info!(task = name, "task started");

            let outcome = task.execute(ctx).await;
            guard.track(ctx);
            let duration = start.elapsed();
            reports.push(TaskReport {
                name: name.to_string(),
                duration,
                succeeded: outcome.is_ok(),
            });

            match outcome {
                Ok(()) => {
                    tracing::info!(task = name, duration_ms = duration.as_millis() as u64, "task succeeded");
                }
                Err(e) => {
                    tracing::error!(task = name, error = %e, "task failed");
                    return PipelineResult::Failure {
                        task: name.to_string(),
                        reason: e.user_message().to_string(),
                        tasks: reports,
                    };
                }
            }
        }

        PipelineResult::Success {
            artifact_url: ctx.artifact_url.clone(),
            archive_size: ctx.archive_size,
            tasks: reports,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ForjaError;
    use crate::generators::test_support::minimal_draft;
    use async_trait::async_trait;
    use std::fs;
    use std::io::{Cursor, Read};
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Sink that keeps uploads in memory
    #[derive(Default)]
    struct RecordingSink {
        uploads: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl RecordingSink {
        fn count(&self) -> usize {
            self.uploads.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ArtifactSink for RecordingSink {
        async fn upload(&self, bytes: Vec<u8>, key: &str) -> ForjaResult<String> {
            self.uploads.lock().unwrap().push((key.to_string(), bytes));
            Ok(format!("https://cdn.example.com/{}", key))
        }
    }

    struct FailingTask;

    #[async_trait]
    impl Task for FailingTask {
        fn name(&self) -> &str {
            "explode"
        }

        async fn execute(&self, _ctx: &mut BuildContext) -> ForjaResult<()> {
            Err(ForjaError::Packaging {
                message: "disk on fire".into(),
            })
        }
    }

    /// Never finishes
    struct HangingTask;

    #[async_trait]
    impl Task for HangingTask {
        fn name(&self) -> &str {
            "hang"
        }

        async fn execute(&self, _ctx: &mut BuildContext) -> ForjaResult<()> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    /// A small platform source tree
    fn platform() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        write(
            root,
            "src/components/campaign/SectionRenderer.tsx",
            "import type { ComponentType } from \"react\";\n\
             export default function SectionRenderer() { return null; }\n",
        );
        write(
            root,
            "src/components/sections/Hero.tsx",
            "import { Button } from \"@/components/ui/Button\";\n\
             import { themeTokens } from \"@/theme\";\n\
             import clsx from \"clsx\";\n\
             export default function Hero() { return null; }\n",
        );
        write(
            root,
            "src/components/ui/Button.tsx",
            "import { cn } from \"@/lib/utils\";\nexport const Button = () => null;\n",
        );
        write(root, "src/lib/utils.ts", "export const cn = (...c: string[]) => c.join(' ');\n");
        write(root, "src/lib/unused.ts", "export const unused = true;\n");
        write(root, "src/theme/index.ts", "// platform theme, must not be copied\n");
        write(root, "src/components/layout/headers/Header.tsx", "export default () => null;\n");
        write(root, "src/components/layout/footers/Footer.tsx", "export default () => null;\n");
        write(
            root,
            "src/theme/fragments/color/ocean.json",
            r##"{ "--background": "#ffffff", "--primary": "#0ea5e9" }"##,
        );
        write(
            root,
            "src/theme/fragments/font/modern.json",
            r#"{ "--font-sans": "'Inter', sans-serif" }"#,
        );
        write(root, "src/theme/fragments/radius/soft.json", r#"{ "--radius": "0.75rem" }"#);

        dir
    }

    struct Fixture {
        platform: TempDir,
        scratch: TempDir,
        sink: Arc<RecordingSink>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                platform: platform(),
                scratch: TempDir::new().unwrap(),
                sink: Arc::new(RecordingSink::default()),
            }
        }

        fn config(&self) -> ForjaConfig {
            ForjaConfig {
                source_root: self.platform.path().to_path_buf(),
                scratch_root: self.scratch.path().to_path_buf(),
                ..Default::default()
            }
        }

        fn pipeline(&self, build_command: &str) -> BuildPipeline {
            let config = self.config();
            let themes = DirectoryThemeStore::new(config.source_root.join(&config.layout.theme_dir));
            BuildPipeline::standard(
                &config,
                Arc::new(ShellToolchain::new("sh", build_command, Duration::from_secs(30))),
                self.sink.clone(),
                Arc::new(themes),
            )
        }

        fn scratch_is_empty(&self) -> bool {
            fs::read_dir(self.scratch.path()).unwrap().next().is_none()
        }
    }

    fn draft() -> CampaignDraft {
        CampaignDraft::from_json(
            r#"{
                "draftId": "abc123",
                "version": 3,
                "sections": [
                    { "sectionName": "Hero", "content": { "en": { "title": "Summer sale" } } }
                ],
                "themeConfig": { "colorPreset": "ocean", "fontPreset": "modern", "radiusPreset": "soft" }
            }"#,
        )
        .unwrap()
    }

    const BUILD_OK: &str = "mkdir -p out && echo ok > out/index.html";

    fn read_entry(archive: &mut zip::ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut contents = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        contents
    }

    #[test]
    fn test_standard_task_order() {
        let fixture = Fixture::new();
        assert_eq!(
            fixture.pipeline(BUILD_OK).task_names(),
            vec![
                "setup-directories",
                "generate-manifest",
                "generate-sources",
                "copy-dependencies",
                "run-build",
                "package-artifact",
                "upload-artifact",
            ]
        );
    }

    #[tokio::test]
    async fn test_minimal_draft_is_packaged() {
        let fixture = Fixture::new();
        let result = fixture.pipeline(BUILD_OK).run(&draft()).await.unwrap();

        let (url, size) = match &result {
            PipelineResult::Success {
                artifact_url,
                archive_size,
                ..
            } => (artifact_url.clone().unwrap(), archive_size.unwrap()),
            other => panic!("expected success, got {:?}", other),
        };
        assert!(url.starts_with("https://cdn.example.com/campaigns/abc123/v3-"));
        assert!(size > 0);
        assert!(result.tasks().iter().all(|t| t.succeeded));

        let uploads = fixture.sink.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        let mut archive = zip::ZipArchive::new(Cursor::new(uploads[0].1.clone())).unwrap();
        let names: Vec<String> = archive.file_names().map(String::from).collect();

        for expected in [
            "package.json",
            "app/layout.tsx",
            "app/page.tsx",
            "app/globals.css",
            "src/theme/index.ts",
            "src/components/campaign/SectionRenderer.tsx",
            "src/components/sections/Hero.tsx",
            "src/components/ui/Button.tsx",
            "src/lib/utils.ts",
            "out/index.html",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {}", expected);
        }
        assert!(!names.iter().any(|n| n.starts_with("src/components/layout/")));
        assert!(!names.iter().any(|n| n == "src/lib/unused.ts"));

        assert!(read_entry(&mut archive, "app/page.tsx").contains("Hero"));
        assert!(read_entry(&mut archive, "package.json").contains("\"clsx\""));
        assert!(read_entry(&mut archive, "src/theme/index.ts").contains("Generated by forja"));
    }

    #[tokio::test]
    async fn test_success_cleans_scratch() {
        let fixture = Fixture::new();
        let result = fixture.pipeline(BUILD_OK).run(&draft()).await.unwrap();

        assert!(result.is_success());
        assert!(fixture.scratch_is_empty());
    }

    #[tokio::test]
    async fn test_build_failure_short_circuits() {
        let fixture = Fixture::new();
        let result = fixture
            .pipeline("echo 'Type error: nope' >&2; exit 1")
            .run(&draft())
            .await
            .unwrap();

        match &result {
            PipelineResult::Failure { task, reason, tasks } => {
                assert_eq!(task, "run-build");
                assert!(reason.contains("build failed"));
                assert!(!reason.contains("Type error"));
                assert!(!tasks.iter().any(|t| t.name == "upload-artifact"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(fixture.sink.count(), 0);
        assert!(fixture.scratch_is_empty());
    }

    #[tokio::test]
    async fn test_missing_output_dir_fails_build() {
        let fixture = Fixture::new();
        let result = fixture.pipeline("true").run(&draft()).await.unwrap();

        match result {
            PipelineResult::Failure { task, reason, .. } => {
                assert_eq!(task, "run-build");
                assert_eq!(reason, "build failed");
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(fixture.sink.count(), 0);
    }

    #[tokio::test]
    async fn test_missing_draft_id_touches_nothing() {
        let fixture = Fixture::new();
        let draft = CampaignDraft::from_json(r#"{ "draftId": null, "sections": [] }"#).unwrap();

        let err = fixture.pipeline(BUILD_OK).run(&draft).await.unwrap_err();

        assert!(matches!(err, ForjaError::MissingDraftId));
        assert!(fixture.scratch_is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_run_for_same_draft_is_refused() {
        let fixture = Fixture::new();
        let busy = fixture.scratch.path().join("forja-abc123");
        fs::create_dir(&busy).unwrap();
        fs::write(busy.join("marker"), "in progress").unwrap();

        let result = fixture.pipeline(BUILD_OK).run(&draft()).await.unwrap();

        match result {
            PipelineResult::Failure { task, .. } => assert_eq!(task, "setup-directories"),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(busy.join("marker").exists());
    }

    #[tokio::test]
    async fn test_unknown_section_fails_copy() {
        let fixture = Fixture::new();
        let draft = CampaignDraft::from_json(
            r#"{ "draftId": "abc123", "sections": [ { "sectionName": "Pricing" } ],
                 "themeConfig": { "colorPreset": "ocean", "fontPreset": "modern", "radiusPreset": "soft" } }"#,
        )
        .unwrap();

        let result = fixture.pipeline(BUILD_OK).run(&draft).await.unwrap();

        match result {
            PipelineResult::Failure { task, reason, .. } => {
                assert_eq!(task, "copy-dependencies");
                assert_eq!(reason, "component resolution failed");
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(fixture.scratch_is_empty());
    }

    #[tokio::test]
    async fn test_custom_task_list() {
        let scratch = TempDir::new().unwrap();
        let pipeline = BuildPipeline::new(
            scratch.path().to_path_buf(),
            PathBuf::from("out"),
            vec![Box::new(SetupDirectories), Box::new(FailingTask)],
        );
        let ctx = BuildContext::new(minimal_draft(), scratch.path(), Path::new("out"));

        let result = pipeline.run_context(ctx).await;

        match result {
            PipelineResult::Failure { task, reason, tasks } => {
                assert_eq!(task, "explode");
                assert_eq!(reason, "packaging failed");
                assert_eq!(tasks.len(), 2);
                assert!(tasks[0].succeeded);
                assert!(!tasks[1].succeeded);
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(fs::read_dir(scratch.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_dropped_run_removes_scratch() {
        let scratch = TempDir::new().unwrap();
        let pipeline = BuildPipeline::new(
            scratch.path().to_path_buf(),
            PathBuf::from("out"),
            vec![Box::new(SetupDirectories), Box::new(HangingTask)],
        );
        let ctx = BuildContext::new(minimal_draft(), scratch.path(), Path::new("out"));
        let temp_dir = ctx.temp_dir.clone();

        let outcome = tokio::time::timeout(Duration::from_millis(200), pipeline.run_context(ctx)).await;

        assert!(outcome.is_err());
        assert!(!temp_dir.exists());
        assert!(fs::read_dir(scratch.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_dropped_run_leaves_foreign_dir() {
        let scratch = TempDir::new().unwrap();
        let busy = scratch.path().join("forja-abc123");
        fs::create_dir(&busy).unwrap();

        let pipeline = BuildPipeline::new(
            scratch.path().to_path_buf(),
            PathBuf::from("out"),
            vec![Box::new(HangingTask)],
        );
        let ctx = BuildContext::new(minimal_draft(), scratch.path(), Path::new("out"));

        let outcome = tokio::time::timeout(Duration::from_millis(100), pipeline.run_context(ctx)).await;

        assert!(outcome.is_err());
        assert!(busy.exists());
    }
}
