//! Prepare orchestration
//!
//! One `prepare` call:
//! 1. Locate the project root (`NotAProject` otherwise)
//! 2. Resolve the platform set (`NoPlatforms` when none are added; an
//!    explicit platform narrows the set even if it is not added yet)
//! 3. Fire `before_prepare`
//! 4. For each platform in order: prepare it, then integrate plugins
//! 5. Fire `after_prepare`
//!
//! The first failure ends the run. Nothing runs concurrently.

mod error;
mod step;

pub use error::{PrepareError, StepError};
pub use step::{prepare_platform, PlatformReport, PrepareContext};

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::config::PrepareSettings;
use crate::hooks::{HookEvent, HookPayload, HookRunner};
use crate::metadata::MetadataStore;
use crate::platform::{PlatformFactory, PlatformProject};
use crate::plugins::PluginIntegrator;
use crate::project::{ProjectPaths, ProjectRegistry};

/// Caller options for a run
#[derive(Debug, Clone, PartialEq)]
pub struct PrepareOptions {
    pub verbose: bool,
    /// Passed through to hooks untouched
    pub options: serde_json::Value,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            options: serde_json::Value::Array(Vec::new()),
        }
    }
}

/// Result of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct PrepareReport {
    pub run_id: String,
    pub platforms: Vec<PlatformReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Runs the prepare stage against injected collaborators.
pub struct Preparer {
    settings: PrepareSettings,
    registry: Arc<dyn ProjectRegistry>,
    factory: Arc<dyn PlatformFactory>,
    hooks: Arc<dyn HookRunner>,
    plugins: Arc<dyn PluginIntegrator>,
    metadata: Arc<dyn MetadataStore>,
}

impl Preparer {
    pub fn new(
        settings: PrepareSettings,
        registry: Arc<dyn ProjectRegistry>,
        factory: Arc<dyn PlatformFactory>,
        hooks: Arc<dyn HookRunner>,
        plugins: Arc<dyn PluginIntegrator>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        Self {
            settings,
            registry,
            factory,
            hooks,
            plugins,
            metadata,
        }
    }

    /// Prepare `platform`, or every added platform when `None`, for the
    /// project containing `start`.
    pub async fn prepare(
        &self,
        start: &Path,
        platform: Option<&str>,
        options: PrepareOptions,
    ) -> Result<PrepareReport, PrepareError> {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("prepare", run_id = %run_id);
        self.run(run_id, start, platform, options)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        run_id: String,
        start: &Path,
        platform: Option<&str>,
        options: PrepareOptions,
    ) -> Result<PrepareReport, PrepareError> {
        let started_at = Utc::now();

        let root = self
            .registry
            .find_root(start)
            .ok_or_else(|| PrepareError::NotAProject {
                start: start.to_path_buf(),
            })?;

        let added = self.registry.list_platforms(&root)?;
        if added.is_empty() {
            return Err(PrepareError::NoPlatforms);
        }
        let targets = match platform {
            Some(id) => vec![id.to_string()],
            None => added,
        };

        let paths = ProjectPaths::new(&root, &self.settings);
        let projects = self.open_platforms(&targets, &paths)?;
        info!(root = %root.display(), platforms = ?targets, "preparing");

        let payload = HookPayload {
            verbose: options.verbose,
            platforms: targets,
            options: options.options,
            paths: projects.iter().map(|p| p.web_asset_dir()).collect(),
        };
        self.fire(HookEvent::BeforePrepare, &payload).await?;

        let singletons = self.settings.singleton_tags();
        let ctx = PrepareContext {
            paths: &paths,
            singletons: &singletons,
            metadata: self.metadata.as_ref(),
        };

        let mut reports = Vec::with_capacity(projects.len());
        for project in &projects {
            let span = info_span!("platform", platform = project.id());
            let report = self
                .prepare_one(&ctx, project.as_ref())
                .instrument(span)
                .await?;
            reports.push(report);
        }

        self.fire(HookEvent::AfterPrepare, &payload).await?;
        info!(count = reports.len(), "prepare complete");

        Ok(PrepareReport {
            run_id,
            platforms: reports,
            started_at,
            finished_at: Utc::now(),
        })
    }

    fn open_platforms(
        &self,
        targets: &[String],
        paths: &ProjectPaths,
    ) -> Result<Vec<Box<dyn PlatformProject>>, PrepareError> {
        targets
            .iter()
            .map(|id| {
                self.factory
                    .open(id, paths)
                    .map_err(|e| PrepareError::Platform {
                        platform: id.clone(),
                        source: StepError::Open(e),
                    })
            })
            .collect()
    }

    async fn prepare_one(
        &self,
        ctx: &PrepareContext<'_>,
        project: &dyn PlatformProject,
    ) -> Result<PlatformReport, PrepareError> {
        let id = project.id();
        info!("preparing platform");

        let report = prepare_platform(ctx, project)
            .await
            .map_err(|source| PrepareError::Platform {
                platform: id.to_string(),
                source,
            })?;

        self.plugins
            .prepare(id, ctx.paths)
            .await
            .map_err(|source| PrepareError::Plugins {
                platform: id.to_string(),
                source,
            })?;

        Ok(report)
    }

    async fn fire(&self, event: HookEvent, payload: &HookPayload) -> Result<(), PrepareError> {
        info!(hook = %event, "firing hook");
        self.hooks
            .fire(event, payload)
            .await
            .map_err(|source| PrepareError::Hook { event, source })
    }
}
