//! Errors surfaced by a prepare run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use xplat_document::DocumentError;

use crate::hooks::{HookError, HookEvent};
use crate::metadata::MetadataError;
use crate::platform::PlatformError;
use crate::plugins::PluginError;
use crate::project::ProjectError;

/// Failure while preparing a single platform
#[derive(Debug, Error)]
pub enum StepError {
    #[error("cannot open platform: {0}")]
    Open(#[source] PlatformError),

    #[error(transparent)]
    WebAssets(PlatformError),

    #[error("configuration document: {0}")]
    Document(#[from] DocumentError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    NativeProject(PlatformError),

    #[error("platform metadata: {0}")]
    Metadata(#[from] MetadataError),
}

/// Failure of a whole prepare run
#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("Current working directory is not an xplat-based project.")]
    NotAProject { start: PathBuf },

    #[error("No platforms added to this project.")]
    NoPlatforms,

    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error("{event} hook failed: {source}")]
    Hook {
        event: HookEvent,
        #[source]
        source: HookError,
    },

    #[error("preparing {platform} failed: {source}")]
    Platform {
        platform: String,
        #[source]
        source: StepError,
    },

    #[error("plugin integration for {platform} failed: {source}")]
    Plugins {
        platform: String,
        #[source]
        source: PluginError,
    },
}

impl PrepareError {
    /// Platform the failure belongs to, if any
    pub fn platform(&self) -> Option<&str> {
        match self {
            PrepareError::Platform { platform, .. } | PrepareError::Plugins { platform, .. } => {
                Some(platform)
            }
            _ => None,
        }
    }

    /// Process exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            PrepareError::NotAProject { .. } => 2,
            PrepareError::NoPlatforms => 3,
            PrepareError::Project(_) => 4,
            PrepareError::Hook { .. } => 10,
            PrepareError::Platform { .. } => 20,
            PrepareError::Plugins { .. } => 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_messages() {
        let err = PrepareError::NotAProject {
            start: PathBuf::from("/tmp"),
        };
        assert_eq!(
            err.to_string(),
            "Current working directory is not an xplat-based project."
        );
        assert_eq!(
            PrepareError::NoPlatforms.to_string(),
            "No platforms added to this project."
        );
    }

    #[test]
    fn test_platform_is_reported() {
        let err = PrepareError::Platform {
            platform: "ios".to_string(),
            source: StepError::NativeProject(PlatformError::NativeProject("bad".to_string())),
        };
        assert_eq!(err.platform(), Some("ios"));
        assert!(err.to_string().starts_with("preparing ios failed"));
        assert_eq!(PrepareError::NoPlatforms.platform(), None);
    }

    #[test]
    fn test_platform_failure_prefix_appears_once() {
        let err = StepError::NativeProject(PlatformError::NativeProject("bad".to_string()));
        assert_eq!(err.to_string(), "native project update failed: bad");

        let err = StepError::WebAssets(PlatformError::WebAssets("disk full".to_string()));
        assert_eq!(err.to_string(), "web asset update failed: disk full");
        assert!(std::error::Error::source(&err).is_none());

        let err = PrepareError::Platform {
            platform: "ios".to_string(),
            source: StepError::NativeProject(PlatformError::NativeProject("bad".to_string())),
        };
        assert_eq!(
            err.to_string(),
            "preparing ios failed: native project update failed: bad"
        );
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            PrepareError::NotAProject {
                start: PathBuf::new(),
            }
            .exit_code(),
            PrepareError::NoPlatforms.exit_code(),
            PrepareError::Platform {
                platform: "a".to_string(),
                source: StepError::Open(PlatformError::Unknown("a".to_string())),
            }
            .exit_code(),
            PrepareError::Plugins {
                platform: "a".to_string(),
                source: PluginError::Failed {
                    command: "x".to_string(),
                    status: "1".to_string(),
                },
            }
            .exit_code(),
        ];
        assert_eq!(codes, [2, 3, 20, 30]);
    }
}
