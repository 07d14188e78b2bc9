//! Extensibility hooks fired around a prepare run.

mod script;

pub use script::ScriptHookRunner;

use std::fmt;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Hook points of a prepare run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookEvent {
    BeforePrepare,
    AfterPrepare,
}

impl HookEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookEvent::BeforePrepare => "before_prepare",
            HookEvent::AfterPrepare => "after_prepare",
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload handed to every hook. `paths[i]` is the web asset directory of
/// `platforms[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookPayload {
    pub verbose: bool,
    pub platforms: Vec<String>,
    /// Caller options, passed through untouched
    pub options: serde_json::Value,
    pub paths: Vec<PathBuf>,
}

/// Errors raised while firing a hook
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("failed to read hook directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn hook script {script}: {source}")]
    Spawn {
        script: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("hook script {script} exited with {status}{}", stderr_suffix(.stderr))]
    Failed {
        script: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("hook script {script} timed out after {seconds}s")]
    Timeout { script: PathBuf, seconds: u64 },

    #[error("failed to encode hook payload: {0}")]
    Payload(#[from] serde_json::Error),
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}

/// Fires hooks for a prepare run.
#[async_trait]
pub trait HookRunner: Send + Sync {
    async fn fire(&self, event: HookEvent, payload: &HookPayload) -> Result<(), HookError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_names() {
        assert_eq!(HookEvent::BeforePrepare.to_string(), "before_prepare");
        assert_eq!(HookEvent::AfterPrepare.as_str(), "after_prepare");
        assert_eq!(
            serde_json::to_value(HookEvent::AfterPrepare).unwrap(),
            json!("after_prepare")
        );
    }

    #[test]
    fn test_payload_shape() {
        let payload = HookPayload {
            verbose: true,
            platforms: vec!["android".to_string()],
            options: json!([]),
            paths: vec![PathBuf::from("/p/platforms/android/www")],
        };

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "verbose": true,
                "platforms": ["android"],
                "options": [],
                "paths": ["/p/platforms/android/www"],
            })
        );
    }

    #[test]
    fn test_failed_error_message() {
        let err = HookError::Failed {
            script: PathBuf::from("hooks/before_prepare/01.sh"),
            status: "exit status: 3".to_string(),
            stderr: "boom".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "hook script hooks/before_prepare/01.sh exited with exit status: 3: boom"
        );
    }
}
