//! Generic filesystem platform
//!
//! Layout under `platforms/<id>/`:
//! - `www/`        web assets (shared source plus `merges/<id>/` overlay)
//! - `config.xml`  merged configuration document
//! - `native.json` summary of the merged document standing in for native
//!   build files

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use xplat_document::{Document, Element};

use super::www::WebAssetSync;
use super::{PlatformError, PlatformFactory, PlatformProject};
use crate::config::PrepareSettings;
use crate::project::ProjectPaths;

/// File written by [`GenericPlatform::update_native_project`]
pub const NATIVE_SUMMARY_FILE: &str = "native.json";

/// Schema identifier for the native summary
pub const NATIVE_SCHEMA_ID: &str = "xplat/native_summary@1";

/// A `<preference>` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    pub name: String,
    pub value: String,
}

/// Native-side view of a merged configuration document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeSummary {
    pub schema_id: String,
    pub platform: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_src: Option<String>,
    pub preferences: Vec<Preference>,
    pub access: Vec<String>,
}

impl NativeSummary {
    pub fn from_document(platform: &str, doc: &Document) -> Self {
        let root = &doc.root;
        let text_of = |name: &str| {
            root.find(name)
                .map(|e| e.text.clone())
                .filter(|t| !t.is_empty())
        };

        Self {
            schema_id: NATIVE_SCHEMA_ID.to_string(),
            platform: platform.to_string(),
            app_id: root.attr("id").map(str::to_string),
            version: root.attr("version").map(str::to_string),
            name: text_of("name"),
            description: text_of("description"),
            content_src: root
                .find("content")
                .and_then(|c| c.attr("src"))
                .map(str::to_string),
            preferences: root
                .find_all("preference")
                .filter_map(preference)
                .collect(),
            access: root
                .find_all("access")
                .filter_map(|a| a.attr("origin"))
                .map(str::to_string)
                .collect(),
        }
    }
}

fn preference(element: &Element) -> Option<Preference> {
    Some(Preference {
        name: element.attr("name")?.to_string(),
        value: element.attr("value").unwrap_or_default().to_string(),
    })
}

/// Platform backed by a plain directory tree
#[derive(Debug, Clone)]
pub struct GenericPlatform {
    id: String,
    root: PathBuf,
    www: PathBuf,
    web_source: PathBuf,
    overlay: PathBuf,
    excludes: Vec<String>,
}

impl GenericPlatform {
    pub fn new(id: &str, paths: &ProjectPaths, excludes: Vec<String>) -> Self {
        Self {
            id: id.to_string(),
            root: paths.platform_dir(id),
            www: paths.platform_www(id),
            web_source: paths.www.clone(),
            overlay: paths.merges_dir(id),
            excludes,
        }
    }

    pub fn native_summary_path(&self) -> PathBuf {
        self.root.join(NATIVE_SUMMARY_FILE)
    }
}

#[async_trait]
impl PlatformProject for GenericPlatform {
    fn id(&self) -> &str {
        &self.id
    }

    fn web_asset_dir(&self) -> PathBuf {
        self.www.clone()
    }

    fn config_document_path(&self) -> PathBuf {
        self.root.join("config.xml")
    }

    async fn update_web_assets(&self) -> Result<(), PlatformError> {
        let sync = WebAssetSync::new(self.web_source.clone(), self.web_asset_dir())?
            .with_overlay(self.overlay.clone())
            .with_excludes(&self.excludes)?;

        let stats = tokio::task::spawn_blocking(move || sync.run())
            .await
            .map_err(|e| PlatformError::Task(e.to_string()))??;

        debug!(
            platform = %self.id,
            shared = stats.shared_files,
            overlay = stats.overlay_files,
            "web assets updated"
        );
        Ok(())
    }

    async fn update_native_project(&self, merged: &Document) -> Result<(), PlatformError> {
        let summary = NativeSummary::from_document(&self.id, merged);
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| PlatformError::NativeProject(e.to_string()))?;

        let path = self.native_summary_path();
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| PlatformError::io(&self.root, e))?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| PlatformError::io(&path, e))
    }
}

/// Factory producing [`GenericPlatform`]s for any well-formed identifier
#[derive(Debug, Clone, Default)]
pub struct GenericPlatformFactory {
    settings: PrepareSettings,
}

impl GenericPlatformFactory {
    pub fn new(settings: PrepareSettings) -> Self {
        Self { settings }
    }
}

impl PlatformFactory for GenericPlatformFactory {
    fn open(
        &self,
        platform_id: &str,
        paths: &ProjectPaths,
    ) -> Result<Box<dyn PlatformProject>, PlatformError> {
        let well_formed = !platform_id.is_empty()
            && !platform_id.starts_with('.')
            && platform_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !well_formed {
            return Err(PlatformError::Unknown(platform_id.to_string()));
        }

        Ok(Box::new(GenericPlatform::new(
            platform_id,
            paths,
            self.settings.web.excludes.clone(),
        )))
    }
}
