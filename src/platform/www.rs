//! Web asset synchronization
//!
//! Replaces a platform's web asset tree with a fresh copy of the shared
//! web source, then lays the platform's overlay directory on top so that
//! platform-specific files win.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use super::exclude::{ExcludeRules, IGNORE_FILE};
use super::PlatformError;

/// Counts reported after a sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Files copied from the shared web source
    pub shared_files: usize,
    /// Files copied from the platform overlay
    pub overlay_files: usize,
}

/// One web asset sync for one platform
#[derive(Debug, Clone)]
pub struct WebAssetSync {
    source: PathBuf,
    dest: PathBuf,
    overlay: Option<PathBuf>,
    rules: ExcludeRules,
}

impl WebAssetSync {
    pub fn new(source: PathBuf, dest: PathBuf) -> Result<Self, PlatformError> {
        Ok(Self {
            source,
            dest,
            overlay: None,
            rules: ExcludeRules::new()?,
        })
    }

    /// Overlay directory copied after the shared source (skipped when absent)
    pub fn with_overlay(mut self, overlay: PathBuf) -> Self {
        self.overlay = Some(overlay);
        self
    }

    /// Extra exclusion patterns
    pub fn with_excludes<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self, PlatformError> {
        self.rules = self.rules.with_patterns(patterns)?;
        Ok(self)
    }

    /// Run the sync. Blocking; callers on the async runtime should use
    /// `spawn_blocking`.
    pub fn run(&self) -> Result<SyncStats, PlatformError> {
        if !self.source.is_dir() {
            return Err(PlatformError::WebAssets(format!(
                "web source {} is not a directory",
                self.source.display()
            )));
        }

        if self.dest.exists() {
            fs::remove_dir_all(&self.dest).map_err(|e| PlatformError::io(&self.dest, e))?;
        }
        fs::create_dir_all(&self.dest).map_err(|e| PlatformError::io(&self.dest, e))?;

        let rules = self.rules.clone().with_ignore_file(&self.source.join(IGNORE_FILE))?;
        let mut stats = SyncStats {
            shared_files: copy_tree(&self.source, &self.dest, &rules)?,
            ..SyncStats::default()
        };

        if let Some(overlay) = self.overlay.as_deref().filter(|p| p.is_dir()) {
            stats.overlay_files = copy_tree(overlay, &self.dest, &self.rules)?;
            debug!(overlay = %overlay.display(), files = stats.overlay_files, "applied web overlay");
        }

        Ok(stats)
    }
}

/// Copy every non-excluded file under `from` into `to`, returning the file count
fn copy_tree(from: &Path, to: &Path, rules: &ExcludeRules) -> Result<usize, PlatformError> {
    let mut copied = 0;

    let walker = WalkDir::new(from)
        .follow_links(true)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        .into_iter()
        .filter_entry(|entry| {
            entry
                .path()
                .strip_prefix(from)
                .map(|rel| rel.as_os_str().is_empty() || !rules.is_excluded(rel))
                .unwrap_or(false)
        });

    for entry in walker {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(from)
            .map_err(|_| PlatformError::WebAssets(format!("{} escapes {}", entry.path().display(), from.display())))?;
        if rel.as_os_str().is_empty() {
            continue;
        }

        let target = to.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| PlatformError::io(&target, e))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| PlatformError::io(parent, e))?;
            }
            fs::copy(entry.path(), &target).map_err(|e| PlatformError::io(entry.path(), e))?;
            copied += 1;
        }
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_source(root: &Path) -> PathBuf {
        let www = root.join("www");
        fs::create_dir_all(www.join("js")).unwrap();
        fs::write(www.join("index.html"), "<html>shared</html>").unwrap();
        fs::write(www.join("js/app.js"), "shared()").unwrap();
        fs::write(www.join(".DS_Store"), "junk").unwrap();
        www
    }

    #[test]
    fn test_sync_copies_and_excludes() {
        let dir = TempDir::new().unwrap();
        let www = create_source(dir.path());
        let dest = dir.path().join("platforms/web/www");

        let stats = WebAssetSync::new(www, dest.clone()).unwrap().run().unwrap();

        assert_eq!(stats.shared_files, 2);
        assert!(dest.join("index.html").is_file());
        assert!(dest.join("js/app.js").is_file());
        assert!(!dest.join(".DS_Store").exists());
    }

    #[test]
    fn test_sync_replaces_stale_files() {
        let dir = TempDir::new().unwrap();
        let www = create_source(dir.path());
        let dest = dir.path().join("out");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("stale.js"), "old").unwrap();

        WebAssetSync::new(www, dest.clone()).unwrap().run().unwrap();

        assert!(!dest.join("stale.js").exists());
    }

    #[test]
    fn test_overlay_wins() {
        let dir = TempDir::new().unwrap();
        let www = create_source(dir.path());
        let overlay = dir.path().join("merges/android");
        fs::create_dir_all(overlay.join("js")).unwrap();
        fs::write(overlay.join("js/app.js"), "android()").unwrap();
        fs::write(overlay.join("android.css"), "body{}").unwrap();
        let dest = dir.path().join("out");

        let stats = WebAssetSync::new(www, dest.clone())
            .unwrap()
            .with_overlay(overlay)
            .run()
            .unwrap();

        assert_eq!(stats.overlay_files, 2);
        assert_eq!(fs::read_to_string(dest.join("js/app.js")).unwrap(), "android()");
        assert_eq!(fs::read_to_string(dest.join("index.html")).unwrap(), "<html>shared</html>");
    }

    #[test]
    fn test_missing_overlay_is_skipped() {
        let dir = TempDir::new().unwrap();
        let www = create_source(dir.path());

        let stats = WebAssetSync::new(www, dir.path().join("out"))
            .unwrap()
            .with_overlay(dir.path().join("merges/ios"))
            .run()
            .unwrap();

        assert_eq!(stats.overlay_files, 0);
    }

    #[test]
    fn test_ignore_file_and_configured_excludes() {
        let dir = TempDir::new().unwrap();
        let www = create_source(dir.path());
        fs::write(www.join(IGNORE_FILE), "js\njs/**\n").unwrap();
        fs::write(www.join("app.js.map"), "{}").unwrap();
        let dest = dir.path().join("out");

        WebAssetSync::new(www, dest.clone())
            .unwrap()
            .with_excludes(&["*.map"])
            .unwrap()
            .run()
            .unwrap();

        assert!(dest.join("index.html").exists());
        assert!(!dest.join("js").exists());
        assert!(!dest.join("app.js.map").exists());
        assert!(!dest.join(IGNORE_FILE).exists());
    }

    #[test]
    fn test_missing_source_fails() {
        let dir = TempDir::new().unwrap();
        let err = WebAssetSync::new(dir.path().join("nope"), dir.path().join("out"))
            .unwrap()
            .run()
            .unwrap_err();
        assert!(matches!(err, PlatformError::WebAssets(_)));
    }
}
