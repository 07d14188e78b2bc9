//! Recording fakes for every prepare collaborator.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use xplat_document::Document;

use super::failure::Operation;
use super::state::{MockEvent, MockState};
use crate::hooks::{HookError, HookEvent, HookPayload, HookRunner};
use crate::metadata::{MetadataError, MetadataStore, PlatformMetadata};
use crate::platform::{PlatformError, PlatformFactory, PlatformProject};
use crate::plugins::{PluginError, PluginIntegrator};
use crate::project::{ProjectError, ProjectPaths, ProjectRegistry};

/// Registry with a fixed root and platform list
#[derive(Debug, Clone)]
pub struct MockRegistry {
    state: MockState,
    root: Option<PathBuf>,
    platforms: Vec<String>,
}

impl MockRegistry {
    /// `root = None` behaves as if no project exists
    pub fn new(state: &MockState, root: Option<PathBuf>, platforms: &[&str]) -> Self {
        Self {
            state: state.clone(),
            root,
            platforms: platforms.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl ProjectRegistry for MockRegistry {
    fn find_root(&self, _start: &Path) -> Option<PathBuf> {
        self.root.clone()
    }

    fn list_platforms(&self, root: &Path) -> Result<Vec<String>, ProjectError> {
        if let Some(message) = self.state.check(Operation::ListPlatforms, None) {
            return Err(ProjectError::ListPlatforms {
                path: root.to_path_buf(),
                source: io::Error::other(message),
            });
        }
        Ok(self.platforms.clone())
    }
}

/// Factory handing out [`MockPlatform`]s
#[derive(Debug, Clone)]
pub struct MockPlatformFactory {
    state: MockState,
}

impl MockPlatformFactory {
    pub fn new(state: &MockState) -> Self {
        Self {
            state: state.clone(),
        }
    }
}

impl PlatformFactory for MockPlatformFactory {
    fn open(
        &self,
        platform_id: &str,
        paths: &ProjectPaths,
    ) -> Result<Box<dyn PlatformProject>, PlatformError> {
        if self
            .state
            .check(Operation::OpenPlatform, Some(platform_id))
            .is_some()
        {
            return Err(PlatformError::Unknown(platform_id.to_string()));
        }
        Ok(Box::new(MockPlatform {
            state: self.state.clone(),
            id: platform_id.to_string(),
            root: paths.platform_dir(platform_id),
        }))
    }
}

/// Platform that records its calls. The configuration document lives on
/// disk at `<platforms>/<id>/config.xml`; nothing else is written.
#[derive(Debug, Clone)]
pub struct MockPlatform {
    state: MockState,
    id: String,
    root: PathBuf,
}

#[async_trait]
impl PlatformProject for MockPlatform {
    fn id(&self) -> &str {
        &self.id
    }

    fn web_asset_dir(&self) -> PathBuf {
        self.root.join("www")
    }

    fn config_document_path(&self) -> PathBuf {
        self.root.join("config.xml")
    }

    async fn update_web_assets(&self) -> Result<(), PlatformError> {
        self.state.record(MockEvent::WebAssets {
            platform: self.id.clone(),
        });
        match self.state.check(Operation::UpdateWebAssets, Some(&self.id)) {
            Some(message) => Err(PlatformError::WebAssets(message)),
            None => Ok(()),
        }
    }

    async fn update_native_project(&self, merged: &Document) -> Result<(), PlatformError> {
        self.state.record(MockEvent::NativeProject {
            platform: self.id.clone(),
            document: merged.clone(),
        });
        match self.state.check(Operation::UpdateNativeProject, Some(&self.id)) {
            Some(message) => Err(PlatformError::NativeProject(message)),
            None => Ok(()),
        }
    }
}

/// Hook runner that records every fire
#[derive(Debug, Clone)]
pub struct MockHooks {
    state: MockState,
}

impl MockHooks {
    pub fn new(state: &MockState) -> Self {
        Self {
            state: state.clone(),
        }
    }
}

#[async_trait]
impl HookRunner for MockHooks {
    async fn fire(&self, event: HookEvent, payload: &HookPayload) -> Result<(), HookError> {
        self.state.record(MockEvent::Hook {
            event,
            payload: payload.clone(),
        });
        let op = match event {
            HookEvent::BeforePrepare => Operation::BeforePrepareHook,
            HookEvent::AfterPrepare => Operation::AfterPrepareHook,
        };
        match self.state.check(op, None) {
            Some(message) => Err(HookError::Failed {
                script: PathBuf::from(event.as_str()),
                status: "exit status: 1".to_string(),
                stderr: message,
            }),
            None => Ok(()),
        }
    }
}

/// Plugin integrator that records every call
#[derive(Debug, Clone)]
pub struct MockPlugins {
    state: MockState,
}

impl MockPlugins {
    pub fn new(state: &MockState) -> Self {
        Self {
            state: state.clone(),
        }
    }
}

#[async_trait]
impl PluginIntegrator for MockPlugins {
    async fn prepare(&self, platform: &str, _paths: &ProjectPaths) -> Result<(), PluginError> {
        self.state.record(MockEvent::Plugins {
            platform: platform.to_string(),
        });
        match self.state.check(Operation::Plugins, Some(platform)) {
            Some(message) => Err(PluginError::Failed {
                command: "mock-plugins".to_string(),
                status: message,
            }),
            None => Ok(()),
        }
    }
}

/// In-memory metadata store
#[derive(Debug, Clone)]
pub struct MockMetadataStore {
    state: MockState,
}

impl MockMetadataStore {
    pub fn new(state: &MockState) -> Self {
        Self {
            state: state.clone(),
        }
    }
}

impl MetadataStore for MockMetadataStore {
    fn load(&self, platform: &str) -> Result<PlatformMetadata, MetadataError> {
        if let Some(message) = self.state.check(Operation::MetadataLoad, Some(platform)) {
            return Err(MetadataError::Io {
                path: PathBuf::from(platform),
                source: io::Error::other(message),
            });
        }
        Ok(self
            .state
            .metadata(platform)
            .unwrap_or_else(|| PlatformMetadata::new(platform)))
    }

    fn save(&self, metadata: &PlatformMetadata) -> Result<(), MetadataError> {
        if let Some(message) = self
            .state
            .check(Operation::MetadataSave, Some(&metadata.platform))
        {
            return Err(MetadataError::Io {
                path: PathBuf::from(&metadata.platform),
                source: io::Error::other(message),
            });
        }
        self.state.record(MockEvent::MetadataSaved {
            platform: metadata.platform.clone(),
        });
        self.state.store_metadata(metadata.clone());
        Ok(())
    }
}
