//! Platform build trees
//!
//! A [`PlatformProject`] is the per-platform view of the build tree: where
//! its web assets live, where its configuration document lives, and how to
//! refresh both the web assets and the native project. Concrete projects
//! are produced by a [`PlatformFactory`].

mod exclude;
mod generic;
mod www;

pub use exclude::{ExcludeError, ExcludeRules, IGNORE_FILE};
pub use generic::{
    GenericPlatform, GenericPlatformFactory, NativeSummary, Preference, NATIVE_SUMMARY_FILE,
};
pub use www::{SyncStats, WebAssetSync};

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use xplat_document::Document;

use crate::project::ProjectPaths;

/// Errors raised by platform projects
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("unknown platform '{0}'")]
    Unknown(String),

    #[error("web asset update failed: {0}")]
    WebAssets(String),

    #[error("native project update failed: {0}")]
    NativeProject(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("exclude rules: {0}")]
    Exclude(#[from] ExcludeError),

    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("background task failed: {0}")]
    Task(String),
}

impl PlatformError {
    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Per-platform build tree.
#[async_trait]
pub trait PlatformProject: Send + Sync {
    /// Platform identifier (e.g. `android`)
    fn id(&self) -> &str;

    /// Directory holding this platform's copy of the web assets
    fn web_asset_dir(&self) -> PathBuf;

    /// Location of this platform's configuration document
    fn config_document_path(&self) -> PathBuf;

    /// Refresh the web asset tree from the project's shared web source
    async fn update_web_assets(&self) -> Result<(), PlatformError>;

    /// Regenerate native build files from the merged configuration
    async fn update_native_project(&self, merged: &Document) -> Result<(), PlatformError>;
}

/// Produces a fresh [`PlatformProject`] for each prepare run.
pub trait PlatformFactory: Send + Sync {
    fn open(
        &self,
        platform_id: &str,
        paths: &ProjectPaths,
    ) -> Result<Box<dyn PlatformProject>, PlatformError>;
}
