//! Exclusion rules for web asset copies
//!
//! Handles default exclusions, configured patterns and `.xplatignore`.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs;
use std::path::Path;

/// Ignore file read from the root of the shared web source
pub const IGNORE_FILE: &str = ".xplatignore";

/// Default patterns never copied into a platform's web assets
const DEFAULT_EXCLUDES: &[&str] = &[
    "**/.git",
    "**/.git/**",
    "**/.DS_Store",
    ".DS_Store",
    "**/Thumbs.db",
    "Thumbs.db",
    "**/*.swp",
    "**/*~",
    IGNORE_FILE,
];

/// Errors for exclusion rules
#[derive(Debug, thiserror::Error)]
pub enum ExcludeError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("glob pattern error: {0}")]
    Glob(#[from] globset::Error),
}

/// Glob set deciding which web source paths are skipped
#[derive(Debug, Clone)]
pub struct ExcludeRules {
    patterns: Vec<String>,
    glob_set: GlobSet,
}

impl ExcludeRules {
    /// Default rules only
    pub fn new() -> Result<Self, ExcludeError> {
        Self::from_patterns(Vec::new())
    }

    fn from_patterns(extra: Vec<String>) -> Result<Self, ExcludeError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in DEFAULT_EXCLUDES.iter().copied().chain(extra.iter().map(String::as_str)) {
            builder.add(Glob::new(pattern)?);
        }
        Ok(Self {
            patterns: extra,
            glob_set: builder.build()?,
        })
    }

    /// Add patterns on top of the current ones
    pub fn with_patterns<S: AsRef<str>>(self, patterns: &[S]) -> Result<Self, ExcludeError> {
        let mut all = self.patterns;
        all.extend(
            patterns
                .iter()
                .map(|p| p.as_ref().trim())
                .filter(|p| !p.is_empty())
                .map(str::to_string),
        );
        Self::from_patterns(all)
    }

    /// Add patterns from an ignore file if it exists (`#` starts a comment)
    pub fn with_ignore_file(self, path: &Path) -> Result<Self, ExcludeError> {
        if !path.is_file() {
            return Ok(self);
        }
        let contents = fs::read_to_string(path).map_err(|source| ExcludeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let patterns: Vec<&str> = contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .collect();
        self.with_patterns(&patterns)
    }

    /// Check if a path relative to the web source root is excluded
    pub fn is_excluded(&self, rel_path: &Path) -> bool {
        self.glob_set.is_match(rel_path)
    }
}
