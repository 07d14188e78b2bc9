//! Typed prepare settings resolved from the effective config.

use std::path::Path;

use serde::{Deserialize, Serialize};
use xplat_document::SingletonTags;

use super::defaults::BuiltinDefaults;

/// Hook execution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookSettings {
    /// Per-script timeout in seconds
    pub timeout_seconds: u64,
}

/// Plugin integration settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginSettings {
    /// External command run once per platform after its native update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// Document merge settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeSettings {
    /// Qualified names merged instead of repeated
    pub singletons: Vec<String>,
}

/// Web asset copy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebSettings {
    /// Extra glob patterns skipped when copying web assets
    #[serde(default)]
    pub excludes: Vec<String>,
}

/// Settings for one prepare run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareSettings {
    pub config_file: String,
    pub www_dir: String,
    pub platforms_dir: String,
    pub merges_dir: String,
    pub hooks_dir: String,
    pub hooks: HookSettings,
    #[serde(default)]
    pub plugins: PluginSettings,
    pub merge: MergeSettings,
    #[serde(default)]
    pub web: WebSettings,
}

impl Default for PrepareSettings {
    fn default() -> Self {
        let defaults = BuiltinDefaults::default();
        Self {
            config_file: defaults.config_file,
            www_dir: defaults.www_dir,
            platforms_dir: defaults.platforms_dir,
            merges_dir: defaults.merges_dir,
            hooks_dir: defaults.hooks_dir,
            hooks: HookSettings {
                timeout_seconds: defaults.hook_timeout_seconds,
            },
            plugins: PluginSettings::default(),
            merge: MergeSettings {
                singletons: defaults.singletons,
            },
            web: WebSettings::default(),
        }
    }
}

impl PrepareSettings {
    /// Singleton table for the merge engine
    pub fn singleton_tags(&self) -> SingletonTags {
        SingletonTags::new(self.merge.singletons.iter().cloned())
    }

    /// True when `dir` holds both the configuration document and the
    /// shared web source, i.e. looks like a project root
    pub fn is_project_root(&self, dir: &Path) -> bool {
        dir.join(&self.config_file).is_file() && dir.join(&self.www_dir).is_dir()
    }
}
