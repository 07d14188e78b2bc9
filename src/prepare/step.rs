//! Preparation of a single platform.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use xplat_document::{empty_document, merge_into_with, Document, SingletonTags};

use super::error::StepError;
use crate::metadata::MetadataStore;
use crate::platform::PlatformProject;
use crate::project::ProjectPaths;

/// Shared inputs for every platform of one run
pub struct PrepareContext<'a> {
    pub paths: &'a ProjectPaths,
    pub singletons: &'a SingletonTags,
    pub metadata: &'a dyn MetadataStore,
}

/// Outcome of preparing one platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformReport {
    pub platform: String,
    pub web_asset_dir: PathBuf,
    pub config_document: PathBuf,
    /// Merged document differs from the previous run's
    pub config_changed: bool,
}

/// Bring one platform's build tree up to date with the project.
///
/// Web assets first, then the configuration document is merged (project
/// document into the platform document, clobbering) and written back, then
/// the native project is updated from the merged document. Metadata is
/// saved last, so a failed step leaves the previous record in place.
pub async fn prepare_platform(
    ctx: &PrepareContext<'_>,
    platform: &dyn PlatformProject,
) -> Result<PlatformReport, StepError> {
    let id = platform.id();

    platform
        .update_web_assets()
        .await
        .map_err(StepError::WebAssets)?;
    debug!(platform = id, "web assets updated");

    let config_path = platform.config_document_path();
    let mut merged = match read_document(&config_path).await? {
        Some(doc) => doc,
        None => {
            debug!(path = %config_path.display(), "no platform document, starting fresh");
            empty_document()
        }
    };
    let project = read_document(&ctx.paths.config_document)
        .await?
        .ok_or_else(|| StepError::Io {
            path: ctx.paths.config_document.clone(),
            source: io::Error::new(io::ErrorKind::NotFound, "project configuration document missing"),
        })?;

    merge_into_with(&project.root, &mut merged.root, id, true, ctx.singletons);

    let xml = xplat_document::to_string(&merged)?;
    persist(&config_path, &xml).await?;
    debug!(platform = id, path = %config_path.display(), "configuration document written");

    platform
        .update_native_project(&merged)
        .await
        .map_err(StepError::NativeProject)?;

    let mut metadata = ctx.metadata.load(id)?;
    let changed = metadata.record_prepare(digest(&xml), platform.web_asset_dir());
    ctx.metadata.save(&metadata)?;

    if changed {
        info!(platform = id, "configuration changed since last prepare");
    } else {
        debug!(platform = id, "configuration unchanged");
    }

    Ok(PlatformReport {
        platform: id.to_string(),
        web_asset_dir: platform.web_asset_dir(),
        config_document: config_path,
        config_changed: changed,
    })
}

/// Read and parse a document; `None` when the file does not exist
async fn read_document(path: &Path) -> Result<Option<Document>, StepError> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(Some(xplat_document::parse_str(&contents)?)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StepError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

async fn persist(path: &Path, xml: &str) -> Result<(), StepError> {
    let io_err = |source| StepError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    tokio::fs::write(path, xml).await.map_err(io_err)
}

fn digest(xml: &str) -> String {
    hex::encode(Sha256::digest(xml.as_bytes()))
}
