//! Platform metadata
//!
//! A small record per platform tracking what the last prepare wrote into
//! its build tree. Stored as `<platforms_dir>/<platform>.json`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema version for platform metadata
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "xplat/platform_metadata@1";

/// Persisted per-platform record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformMetadata {
    pub schema_version: u32,

    pub schema_id: String,

    /// Platform identifier
    pub platform: String,

    /// When the last successful prepare finished
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepared_at: Option<DateTime<Utc>>,

    /// Number of successful prepares
    #[serde(default)]
    pub prepare_count: u64,

    /// SHA-256 of the merged configuration document as last written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_digest: Option<String>,

    /// Web asset directory at the time of the last prepare
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_asset_dir: Option<PathBuf>,
}

impl PlatformMetadata {
    /// Fresh record for a platform that was never prepared
    pub fn new(platform: &str) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            platform: platform.to_string(),
            prepared_at: None,
            prepare_count: 0,
            config_digest: None,
            web_asset_dir: None,
        }
    }

    /// Record a completed prepare. Returns true when the merged document
    /// differs from the previous run's.
    pub fn record_prepare(&mut self, config_digest: String, web_asset_dir: PathBuf) -> bool {
        let changed = self.config_digest.as_deref() != Some(config_digest.as_str());
        self.config_digest = Some(config_digest);
        self.web_asset_dir = Some(web_asset_dir);
        self.prepare_count += 1;
        self.prepared_at = Some(Utc::now());
        changed
    }
}

/// Errors for metadata storage
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load/save access to platform metadata
pub trait MetadataStore: Send + Sync {
    /// Load a platform's record, or a fresh one when none exists
    fn load(&self, platform: &str) -> Result<PlatformMetadata, MetadataError>;

    fn save(&self, metadata: &PlatformMetadata) -> Result<(), MetadataError>;
}

/// JSON files next to the platform build trees
#[derive(Debug, Clone)]
pub struct FileMetadataStore {
    dir: PathBuf,
}

impl FileMetadataStore {
    /// Store records under `dir` (normally the platforms directory)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, platform: &str) -> PathBuf {
        self.dir.join(format!("{}.json", platform))
    }
}

impl MetadataStore for FileMetadataStore {
    fn load(&self, platform: &str) -> Result<PlatformMetadata, MetadataError> {
        let path = self.path_for(platform);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(PlatformMetadata::new(platform))
            }
            Err(source) => return Err(MetadataError::Io { path, source }),
        };
        serde_json::from_str(&contents).map_err(|source| MetadataError::Json { path, source })
    }

    fn save(&self, metadata: &PlatformMetadata) -> Result<(), MetadataError> {
        let path = self.path_for(&metadata.platform);
        write_json(&path, metadata)
    }
}

/// Write pretty JSON via a temp file and rename
fn write_json(path: &Path, metadata: &PlatformMetadata) -> Result<(), MetadataError> {
    let json = serde_json::to_string_pretty(metadata).map_err(|source| MetadataError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let io_err = |source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)
}
