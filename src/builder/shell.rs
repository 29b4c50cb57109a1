// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Shell toolchain
//!
//! Runs the configured build command through a shell, streaming its output
//! line by line into the log as it is produced.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use super::{BuildOutput, Toolchain};
use crate::config::BuildConfig;
use crate::errors::{ForjaError, ForjaResult};

/// Shell toolchain
pub struct ShellToolchain {
    shell: String,
    command: String,
    timeout: Duration,
}

impl ShellToolchain {
    /// Create a toolchain running `command` with `shell -c`
    pub fn new(shell: impl Into<String>, command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            shell: shell.into(),
            command: command.into(),
            timeout,
        }
    }

    /// Create a toolchain from build configuration
    pub fn from_config(config: &BuildConfig) -> Self {
        Self::new(
            config.shell.clone(),
            config.command.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn command(&self, project_root: &Path) -> Command {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(&self.command)
            .current_dir(project_root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group so a timeout can take down the whole tree
        #[cfg(unix)]
        cmd.process_group(0);

        cmd
    }
}

#[async_trait]
impl Toolchain for ShellToolchain {
    async fn build(&self, project_root: &Path, trace_id: &str) -> ForjaResult<BuildOutput> {
        let start = Instant::now();
        let deadline = tokio::time::Instant::now() + self.timeout;

        tracing::info!(
            trace_id,
            command = %self.command,
            cwd = %project_root.display(),
            "starting build"
        );

        let mut child = self
            .command(project_root)
            .spawn()
            .map_err(|e| ForjaError::build_spawn_failed(&self.shell, e))?;
        // The id is gone once the child is reaped, the group outlives it
        let pgid = if cfg!(unix) { child.id() } else { None };
        let mut group = ProcessGroup::new(pgid, trace_id);

        let stdout = child.stdout.take().ok_or_else(|| ForjaError::Io {
            message: "build stdout was not captured".to_string(),
        })?;
        let stderr = child.stderr.take().ok_or_else(|| ForjaError::Io {
            message: "build stderr was not captured".to_string(),
        })?;

        let mut stdout_task = tokio::spawn(forward_lines(stdout, log_line("stdout", trace_id)));
        let mut stderr_task = tokio::spawn(forward_lines(stderr, log_line("stderr", trace_id)));

        let status = match tokio::time::timeout_at(deadline, child.wait()).await {
            Ok(status) => status,
            Err(_) => {
                tracing::error!(trace_id, timeout_secs = self.timeout.as_secs(), "build timed out, killing it");
                group.kill().await;
                if let Err(e) = child.kill().await {
                    tracing::debug!(error = %e, "build process already gone");
                }
                stdout_task.abort();
                stderr_task.abort();
                return Err(self.timed_out());
            }
        };

        // Anything the build left running in the background goes with it
        group.sweep().await;
        let status = status?;

        let drained = tokio::time::timeout_at(deadline, async {
            let stdout = (&mut stdout_task).await.unwrap_or_default();
            let stderr = (&mut stderr_task).await.unwrap_or_default();
            (stdout, stderr)
        })
        .await;
        let (stdout, stderr) = match drained {
            Ok(streams) => streams,
            Err(_) => {
                tracing::error!(trace_id, timeout_secs = self.timeout.as_secs(), "build output still open at deadline");
                stdout_task.abort();
                stderr_task.abort();
                return Err(self.timed_out());
            }
        };
        let duration = start.elapsed();

        if status.success() {
            tracing::info!(trace_id, duration_secs = duration.as_secs_f64(), "build succeeded");
            Ok(BuildOutput {
                exit_code: 0,
                stdout,
                stderr,
                duration,
            })
        } else {
            let exit_code = status.code();
            tracing::error!(trace_id, ?exit_code, "build failed");
            Err(ForjaError::BuildFailed { exit_code, stderr })
        }
    }

    fn describe(&self) -> String {
        format!("{} -c {:?}", self.shell, self.command)
    }

    async fn check_available(&self) -> ForjaResult<bool> {
        Ok(which::which(&self.shell).is_ok())
    }
}

impl ShellToolchain {
    fn timed_out(&self) -> ForjaError {
        ForjaError::BuildTimedOut {
            seconds: self.timeout.as_secs(),
        }
    }
}

/// Line handler that logs build output under the `forja::build` target
fn log_line(stream: &'static str, trace_id: &str) -> impl FnMut(&str) + Send + 'static {
    let trace_id = trace_id.to_string();
    move |line| tracing::info!(target: "forja::build", trace_id = %trace_id, stream, "{}", line)
}

/// Hand each line of `reader` to `on_line` as it arrives and return
/// everything read
async fn forward_lines<R, F>(reader: R, mut on_line: F) -> String
where
    R: AsyncRead + Unpin,
    F: FnMut(&str),
{
    let mut reader = BufReader::new(reader);
    let mut captured = String::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\r', '\n']);
                on_line(line);
                captured.push_str(line);
                captured.push('\n');
            }
            Err(e) => {
                tracing::warn!(error = %e, "stopped reading build output");
                break;
            }
        }
    }

    captured
}

/// The process group a build runs in
///
/// Dropping a live group kills it, so a cancelled build does not leave the
/// bundler running.
struct ProcessGroup {
    pgid: Option<u32>,
    trace_id: String,
}

impl ProcessGroup {
    fn new(pgid: Option<u32>, trace_id: &str) -> Self {
        Self {
            pgid,
            trace_id: trace_id.to_string(),
        }
    }

    /// Kill the group, warning when that fails
    async fn kill(&mut self) {
        let Some(pgid) = self.pgid.take() else {
            return;
        };

        match Command::from(kill_command(pgid)).status().await {
            Ok(status) if status.success() => {}
            Ok(status) => tracing::warn!(
                trace_id = %self.trace_id,
                pgid,
                ?status,
                "kill did not reach the build process group"
            ),
            Err(e) => tracing::warn!(
                trace_id = %self.trace_id,
                pgid,
                error = %e,
                "could not run kill for the build process group"
            ),
        }
    }

    /// Kill whatever is left in the group after the shell exited
    ///
    /// An empty group is the normal case, so only a missing `kill` warns.
    async fn sweep(&mut self) {
        let Some(pgid) = self.pgid.take() else {
            return;
        };

        match Command::from(kill_command(pgid)).status().await {
            Ok(status) if status.success() => {
                tracing::debug!(trace_id = %self.trace_id, pgid, "killed leftover build processes")
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(
                trace_id = %self.trace_id,
                pgid,
                error = %e,
                "could not run kill for the build process group"
            ),
        }
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            if let Err(e) = kill_command(pgid).status() {
                tracing::warn!(trace_id = %self.trace_id, pgid, error = %e, "could not kill build process group");
            }
        }
    }
}

fn kill_command(pgid: u32) -> std::process::Command {
    let mut cmd = std::process::Command::new("kill");
    cmd.args(["-s", "KILL", "--", &format!("-{}", pgid)])
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    cmd
}
