//! Project discovery
//!
//! Locates the project root from a starting directory and lists the
//! platforms that have been added to it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::PrepareSettings;

/// Errors raised while inspecting a project
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("failed to list platforms in {path}: {source}")]
    ListPlatforms {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Project layout and platform registry.
pub trait ProjectRegistry: Send + Sync {
    /// Find the project root at or above `start`.
    fn find_root(&self, start: &Path) -> Option<PathBuf>;

    /// Platforms added to the project at `root`, in a stable order.
    fn list_platforms(&self, root: &Path) -> Result<Vec<String>, ProjectError>;
}

/// Well-known paths of a project, resolved against its root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectPaths {
    pub root: PathBuf,
    /// Project-level configuration document
    pub config_document: PathBuf,
    /// Shared web source
    pub www: PathBuf,
    pub platforms: PathBuf,
    /// Per-platform web overlays (`merges/<platform>`)
    pub merges: PathBuf,
    pub hooks: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: &Path, settings: &PrepareSettings) -> Self {
        Self {
            root: root.to_path_buf(),
            config_document: root.join(&settings.config_file),
            www: root.join(&settings.www_dir),
            platforms: root.join(&settings.platforms_dir),
            merges: root.join(&settings.merges_dir),
            hooks: root.join(&settings.hooks_dir),
        }
    }

    /// Build tree of one platform
    pub fn platform_dir(&self, platform: &str) -> PathBuf {
        self.platforms.join(platform)
    }

    /// Web asset directory inside a platform's build tree
    pub fn platform_www(&self, platform: &str) -> PathBuf {
        self.platform_dir(platform).join("www")
    }

    /// Web overlay directory of one platform
    pub fn merges_dir(&self, platform: &str) -> PathBuf {
        self.merges.join(platform)
    }
}

/// Filesystem-backed registry: a project root holds the configuration
/// document and the web source; each subdirectory of the platforms
/// directory is an added platform.
#[derive(Debug, Clone, Default)]
pub struct DirectoryProject {
    settings: PrepareSettings,
}

impl DirectoryProject {
    pub fn new(settings: PrepareSettings) -> Self {
        Self { settings }
    }
}

impl ProjectRegistry for DirectoryProject {
    fn find_root(&self, start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| self.settings.is_project_root(dir))
            .map(Path::to_path_buf)
    }

    fn list_platforms(&self, root: &Path) -> Result<Vec<String>, ProjectError> {
        let dir = root.join(&self.settings.platforms_dir);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(ProjectError::ListPlatforms { path: dir, source }),
        };

        let mut platforms = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ProjectError::ListPlatforms {
                path: dir.clone(),
                source,
            })?;
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            let name = entry.file_name().to_string_lossy().to_string();
            if is_dir && !name.starts_with('.') {
                platforms.push(name);
            }
        }
        platforms.sort();
        Ok(platforms)
    }
}
