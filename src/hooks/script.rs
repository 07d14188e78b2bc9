//! Hook scripts discovered on disk.
//!
//! Every regular file in `<hooks_dir>/<event>/` is executed in lexical
//! order with the project root as working directory and first argument.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{HookError, HookEvent, HookPayload, HookRunner};

/// Environment variable carrying the event name
pub const ENV_HOOK: &str = "XPLAT_HOOK";
/// Comma-joined platform identifiers
pub const ENV_PLATFORMS: &str = "XPLAT_PLATFORMS";
/// Platform web asset directories, joined like `PATH`
pub const ENV_PATHS: &str = "XPLAT_PATHS";
/// Full payload as JSON
pub const ENV_PAYLOAD: &str = "XPLAT_HOOK_PAYLOAD";

/// Runs hook scripts from the project's hooks directory
#[derive(Debug, Clone)]
pub struct ScriptHookRunner {
    project_root: PathBuf,
    hooks_dir: PathBuf,
    timeout: Duration,
}

impl ScriptHookRunner {
    pub fn new(project_root: impl Into<PathBuf>, hooks_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            project_root: project_root.into(),
            hooks_dir: hooks_dir.into(),
            timeout,
        }
    }

    /// Scripts registered for `event`, sorted by file name
    pub async fn scripts(&self, event: HookEvent) -> Result<Vec<PathBuf>, HookError> {
        let dir = self.hooks_dir.join(event.as_str());
        let io_err = |source| HookError::Io {
            path: dir.clone(),
            source,
        };

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_err(e)),
        };

        let mut scripts = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let file_type = entry.file_type().await.map_err(io_err)?;
            if file_type.is_file() {
                scripts.push(entry.path());
            }
        }
        scripts.sort();
        Ok(scripts)
    }

    async fn run_script(
        &self,
        script: &Path,
        event: HookEvent,
        payload: &HookPayload,
        payload_json: &str,
    ) -> Result<(), HookError> {
        let mut command = Command::new(script);
        command
            .arg(&self.project_root)
            .current_dir(&self.project_root)
            .env(ENV_HOOK, event.as_str())
            .env(ENV_PLATFORMS, payload.platforms.join(","))
            .env(ENV_PAYLOAD, payload_json)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match std::env::join_paths(&payload.paths) {
            Ok(paths) => {
                command.env(ENV_PATHS, paths);
            }
            Err(e) => warn!(error = %e, "platform paths not representable in {}", ENV_PATHS),
        }

        debug!(script = %script.display(), "running hook script");

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(result) => result.map_err(|source| HookError::Spawn {
                script: script.to_path_buf(),
                source,
            })?,
            Err(_) => {
                return Err(HookError::Timeout {
                    script: script.to_path_buf(),
                    seconds: self.timeout.as_secs(),
                })
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            info!(hook = %event, "{}", line);
        }

        if !output.status.success() {
            return Err(HookError::Failed {
                script: script.to_path_buf(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl HookRunner for ScriptHookRunner {
    async fn fire(&self, event: HookEvent, payload: &HookPayload) -> Result<(), HookError> {
        let scripts = self.scripts(event).await?;
        if scripts.is_empty() {
            debug!(hook = %event, "no hook scripts");
            return Ok(());
        }

        let payload_json = serde_json::to_string(payload)?;
        for script in &scripts {
            self.run_script(script, event, payload, &payload_json).await?;
        }
        Ok(())
    }
}
