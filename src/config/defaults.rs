//! Built-in prepare defaults (layer 1)
//!
//! Hardcoded defaults for every setting, used when no host or project
//! file overrides them.

use serde::{Deserialize, Serialize};

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Project configuration document name (default: "config.xml")
    pub config_file: String,

    /// Shared web source directory (default: "www")
    pub www_dir: String,

    /// Per-platform build trees (default: "platforms")
    pub platforms_dir: String,

    /// Per-platform web overlays (default: "merges")
    pub merges_dir: String,

    /// Hook script directories (default: "hooks")
    pub hooks_dir: String,

    /// Per-script hook timeout in seconds (default: 300)
    pub hook_timeout_seconds: u64,

    /// Elements merged rather than repeated
    pub singletons: Vec<String>,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            config_file: "config.xml".to_string(),
            www_dir: "www".to_string(),
            platforms_dir: "platforms".to_string(),
            merges_dir: "merges".to_string(),
            hooks_dir: "hooks".to_string(),
            hook_timeout_seconds: 300,
            singletons: xplat_document::SINGLETON_TAGS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "config_file": self.config_file,
            "www_dir": self.www_dir,
            "platforms_dir": self.platforms_dir,
            "merges_dir": self.merges_dir,
            "hooks_dir": self.hooks_dir,
            "hooks": {
                "timeout_seconds": self.hook_timeout_seconds
            },
            "plugins": {},
            "merge": {
                "singletons": self.singletons
            },
            "web": {
                "excludes": []
            }
        })
    }
}
