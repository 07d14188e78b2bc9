//! xplat prepare stage
//!
//! Reconciles a project's configuration document and web assets into
//! per-platform build trees, firing hooks around the run and handing each
//! platform to a plugin integrator once its native project is updated.
//!
//! The document model and merge engine live in the `xplat-document` crate;
//! this crate holds the orchestration and its collaborators.

pub mod config;
pub mod hooks;
pub mod metadata;
pub mod mock;
pub mod platform;
pub mod plugins;
pub mod prepare;
pub mod project;
pub mod telemetry;

pub use config::{EffectiveConfig, PrepareSettings};
pub use hooks::{HookEvent, HookPayload, HookRunner, ScriptHookRunner};
pub use metadata::{FileMetadataStore, MetadataStore, PlatformMetadata};
pub use platform::{GenericPlatformFactory, PlatformFactory, PlatformProject};
pub use plugins::{CommandPlugins, PluginIntegrator};
pub use prepare::{
    prepare_platform, PlatformReport, PrepareContext, PrepareError, PrepareOptions, PrepareReport,
    Preparer, StepError,
};
pub use project::{DirectoryProject, ProjectPaths, ProjectRegistry};
