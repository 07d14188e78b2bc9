//! Plugin integration, run once per platform after its native update.

use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::project::ProjectPaths;

/// Errors from the plugin integrator
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("failed to spawn plugin command `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("plugin command `{command}` exited with {status}")]
    Failed { command: String, status: String },
}

/// Installs plugin files into a prepared platform.
#[async_trait]
pub trait PluginIntegrator: Send + Sync {
    async fn prepare(&self, platform: &str, paths: &ProjectPaths) -> Result<(), PluginError>;
}

/// Delegates to an external command, if one is configured.
///
/// The command runs through `sh -c` from the project root with the
/// platform id and its web asset directory as `$1` and `$2`.
#[derive(Debug, Clone, Default)]
pub struct CommandPlugins {
    command: Option<String>,
}

impl CommandPlugins {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }
}

#[async_trait]
impl PluginIntegrator for CommandPlugins {
    async fn prepare(&self, platform: &str, paths: &ProjectPaths) -> Result<(), PluginError> {
        let Some(command) = self.command.as_deref() else {
            info!(platform, "no plugin tool configured");
            return Ok(());
        };

        let www = paths.platform_www(platform);
        debug!(platform, command, "running plugin command");

        let status = Command::new("sh")
            .arg("-c")
            .arg(command)
            .arg("xplat-plugins")
            .arg(platform)
            .arg(&www)
            .current_dir(&paths.root)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|source| PluginError::Spawn {
                command: command.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(PluginError::Failed {
                command: command.to_string(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}
