//! Layered prepare settings
//!
//! Settings are merged from four layers, later layers winning:
//! 1. Built-in defaults
//! 2. Host config (~/.config/xplat/prepare.toml)
//! 3. Project config (.xplat/prepare.toml)
//! 4. CLI flags

mod defaults;
mod effective;
mod merge;
mod settings;

pub use defaults::BuiltinDefaults;
pub use effective::{
    default_host_config_path, ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig,
    PROJECT_CONFIG_PATH,
};
pub use merge::{deep_merge, merge_layers};
pub use settings::{HookSettings, MergeSettings, PluginSettings, PrepareSettings, WebSettings};
