//! Effective settings with full provenance
//!
//! The effective config captures the merged settings plus where each
//! contributing layer came from, and converts into typed
//! [`PrepareSettings`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;
use super::settings::PrepareSettings;

/// Schema version for the effective config
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "xplat/effective_config@1";

/// Project-relative settings file
pub const PROJECT_CONFIG_PATH: &str = ".xplat/prepare.toml";

/// Upper bound for a single hook script, in seconds
const MAX_HOOK_TIMEOUT_SECONDS: u64 = 3600;

/// Origin of a configuration source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    Host,
    Project,
    Cli,
}

/// A contributing config source with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    /// Origin of this source
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Effective configuration with full provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub schema_version: u32,

    pub schema_id: String,

    /// When this config was computed
    pub created_at: DateTime<Utc>,

    /// The merged configuration object
    pub config: Value,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,

    /// Redacted key paths
    pub redactions: Vec<String>,
}

/// Keys that may hold secrets (plugin commands sometimes embed tokens)
const SECRET_KEYS: &[&str] = &["password", "token", "secret", "api_key", "credential"];

impl EffectiveConfig {
    /// Build effective config from layers.
    ///
    /// Missing files are skipped; unreadable or malformed files are errors.
    pub fn build(
        host_config_path: Option<&Path>,
        project_config_path: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, ConfigError> {
        let mut layers = vec![BuiltinDefaults::default().to_value()];
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        }];

        for (origin, path) in [
            (ConfigOrigin::Host, host_config_path),
            (ConfigOrigin::Project, project_config_path),
        ] {
            let Some(path) = path.filter(|p| p.exists()) else {
                continue;
            };
            let (value, digest) = Self::load_toml_file(path)?;
            layers.push(value);
            sources.push(ConfigSource {
                origin,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let mut merged = merge_layers(layers);
        Self::validate_config(&merged)?;
        let redactions = Self::redact_secrets(&mut merged);

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            config: merged,
            sources,
            redactions,
        })
    }

    /// Build from the standard host location and a project root.
    pub fn for_project(project_root: &Path, cli_overrides: Option<Value>) -> Result<Self, ConfigError> {
        let host = default_host_config_path();
        let project = project_root.join(PROJECT_CONFIG_PATH);
        Self::build(host.as_deref(), Some(&project), cli_overrides)
    }

    /// Build with an explicitly named settings file in place of the
    /// project file. Unlike the default locations, the file must exist.
    pub fn with_config_file(path: &Path, cli_overrides: Option<Value>) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::IoError(format!(
                "{}: settings file not found",
                path.display()
            )));
        }
        let host = default_host_config_path();
        Self::build(host.as_deref(), Some(path), cli_overrides)
    }

    /// Convert into typed settings. Unknown keys are ignored.
    pub fn settings(&self) -> Result<PrepareSettings, ConfigError> {
        serde_json::from_value(self.config.clone())
            .map_err(|e| ConfigError::ValidationError(format!("invalid settings: {}", e)))
    }

    /// Load and parse a TOML file, returning the value and digest
    fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
        let bytes = fs::read(path).map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        let digest = hex::encode(Sha256::digest(&bytes));

        let contents = String::from_utf8(bytes)
            .map_err(|e| ConfigError::ParseError(format!("{}: invalid UTF-8: {}", path.display(), e)))?;
        let toml_value: toml::Value = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;

        Ok((Self::toml_to_json(toml_value), digest))
    }

    /// Convert TOML Value to JSON Value
    fn toml_to_json(toml: toml::Value) -> Value {
        match toml {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Number(i.into()),
            toml::Value::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(arr) => Value::Array(arr.into_iter().map(Self::toml_to_json).collect()),
            toml::Value::Table(table) => Value::Object(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Self::toml_to_json(v)))
                    .collect(),
            ),
        }
    }

    /// Redact secrets in the config, returning list of redacted paths
    fn redact_secrets(value: &mut Value) -> Vec<String> {
        let mut redactions = Vec::new();
        Self::redact_recursive(value, String::new(), &mut redactions);
        redactions
    }

    fn redact_recursive(value: &mut Value, path: String, redactions: &mut Vec<String>) {
        if let Value::Object(map) = value {
            for (key, val) in map.iter_mut() {
                let current_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };

                let key_lower = key.to_lowercase();
                let is_secret = SECRET_KEYS.iter().any(|s| key_lower.contains(s));

                if is_secret && !val.is_object() && !val.is_array() {
                    *val = Value::String("[REDACTED]".to_string());
                    redactions.push(current_path);
                } else {
                    Self::redact_recursive(val, current_path, redactions);
                }
            }
        }
    }

    /// Validate configuration values
    fn validate_config(config: &Value) -> Result<(), ConfigError> {
        for key in ["config_file", "www_dir", "platforms_dir", "merges_dir", "hooks_dir"] {
            if config.get(key).and_then(|v| v.as_str()).is_some_and(|s| s.trim().is_empty()) {
                return Err(ConfigError::ValidationError(format!("{} must not be empty", key)));
            }
        }

        if let Some(timeout) = config.pointer("/hooks/timeout_seconds").and_then(|v| v.as_u64()) {
            if timeout == 0 || timeout > MAX_HOOK_TIMEOUT_SECONDS {
                return Err(ConfigError::ValidationError(format!(
                    "hooks.timeout_seconds must be in (0, {}]",
                    MAX_HOOK_TIMEOUT_SECONDS
                )));
            }
        }

        if let Some(singletons) = config.pointer("/merge/singletons").and_then(|v| v.as_array()) {
            if singletons.is_empty() {
                return Err(ConfigError::ValidationError(
                    "merge.singletons must name at least one element".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Host-wide settings file (`~/.config/xplat/prepare.toml`), if HOME is set
pub fn default_host_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config/xplat/prepare.toml"))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn get_str<'a>(config: &'a EffectiveConfig, pointer: &str) -> Option<&'a str> {
        config.config.pointer(pointer).and_then(Value::as_str)
    }

    fn get_u64(config: &EffectiveConfig, pointer: &str) -> Option<u64> {
        config.config.pointer(pointer).and_then(Value::as_u64)
    }

    #[test]
    fn test_build_with_defaults_only() {
        let config = EffectiveConfig::build(None, None, None).unwrap();

        assert_eq!(config.schema_version, SCHEMA_VERSION);
        assert_eq!(get_str(&config, "/www_dir"), Some("www"));
        assert_eq!(get_u64(&config, "/hooks/timeout_seconds"), Some(300));
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].origin, ConfigOrigin::Builtin);
    }

    #[test]
    fn test_build_with_cli_override() {
        let cli = serde_json::json!({"hooks": {"timeout_seconds": 30}});
        let config = EffectiveConfig::build(None, None, Some(cli)).unwrap();

        assert_eq!(get_u64(&config, "/hooks/timeout_seconds"), Some(30));
        assert_eq!(config.sources.last().unwrap().origin, ConfigOrigin::Cli);
    }

    #[test]
    fn test_project_file_layer() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "www_dir = \"public\"").unwrap();
        writeln!(temp, "[merge]").unwrap();
        writeln!(temp, "singletons = [\"name\", \"icon\"]").unwrap();

        let config = EffectiveConfig::build(None, Some(temp.path()), None).unwrap();
        let settings = config.settings().unwrap();

        assert_eq!(settings.www_dir, "public");
        assert_eq!(settings.merge.singletons, vec!["name", "icon"]);
        assert_eq!(config.sources[1].origin, ConfigOrigin::Project);
        assert_eq!(config.sources[1].digest.as_ref().map(String::len), Some(64));
    }

    #[test]
    fn test_project_overrides_host() {
        let mut host = NamedTempFile::new().unwrap();
        writeln!(host, "hooks_dir = \"host-hooks\"").unwrap();
        writeln!(host, "platforms_dir = \"build\"").unwrap();
        let mut project = NamedTempFile::new().unwrap();
        writeln!(project, "hooks_dir = \"scripts\"").unwrap();

        let config = EffectiveConfig::build(Some(host.path()), Some(project.path()), None).unwrap();

        assert_eq!(get_str(&config, "/hooks_dir"), Some("scripts"));
        assert_eq!(get_str(&config, "/platforms_dir"), Some("build"));
    }

    #[test]
    fn test_missing_files_skipped() {
        let config = EffectiveConfig::build(
            Some(Path::new("/nonexistent/host.toml")),
            Some(Path::new("/nonexistent/project.toml")),
            None,
        )
        .unwrap();
        assert_eq!(config.sources.len(), 1);
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "www_dir = ").unwrap();

        let err = EffectiveConfig::build(None, Some(temp.path()), None).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_validation_hook_timeout() {
        let cli = serde_json::json!({"hooks": {"timeout_seconds": 0}});
        let err = EffectiveConfig::build(None, None, Some(cli)).unwrap_err();
        assert!(err.to_string().contains("hooks.timeout_seconds"));
    }

    #[test]
    fn test_validation_empty_dir() {
        let cli = serde_json::json!({"www_dir": "  "});
        let err = EffectiveConfig::build(None, None, Some(cli)).unwrap_err();
        assert!(err.to_string().contains("www_dir"));
    }

    #[test]
    fn test_validation_empty_singletons() {
        let cli = serde_json::json!({"merge": {"singletons": []}});
        assert!(EffectiveConfig::build(None, None, Some(cli)).is_err());
    }

    #[test]
    fn test_secret_redaction() {
        let cli = serde_json::json!({"plugins": {"api_key": "abc", "command": "plugman prepare"}});
        let config = EffectiveConfig::build(None, None, Some(cli)).unwrap();

        assert_eq!(get_str(&config, "/plugins/api_key"), Some("[REDACTED]"));
        assert_eq!(get_str(&config, "/plugins/command"), Some("plugman prepare"));
        assert_eq!(config.redactions, vec!["plugins.api_key".to_string()]);
    }

    #[test]
    fn test_explicit_config_file_must_exist() {
        let err = EffectiveConfig::with_config_file(Path::new("/definitely/missing/prepare.toml"), None)
            .unwrap_err();

        assert!(matches!(err, ConfigError::IoError(_)));
        assert!(err.to_string().contains("/definitely/missing/prepare.toml"));
    }

    #[test]
    fn test_explicit_config_file_is_layered() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "platforms_dir = \"out\"").unwrap();

        let config = EffectiveConfig::with_config_file(temp.path(), None).unwrap();

        assert_eq!(get_str(&config, "/platforms_dir"), Some("out"));
        let last = config.sources.last().unwrap();
        assert_eq!(last.origin, ConfigOrigin::Project);
        assert_eq!(last.path.as_deref(), Some(temp.path().to_string_lossy().as_ref()));
    }

    #[test]
    fn test_for_project_reads_project_file() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".xplat")).unwrap();
        std::fs::write(dir.path().join(PROJECT_CONFIG_PATH), "www_dir = \"public\"\n").unwrap();

        let config = EffectiveConfig::for_project(dir.path(), None).unwrap();
        assert_eq!(config.settings().unwrap().www_dir, "public");
    }
}
