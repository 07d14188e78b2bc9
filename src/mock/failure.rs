//! Failure injection for the recording fakes.

use std::collections::HashMap;

/// Fallible collaborator operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListPlatforms,
    OpenPlatform,
    UpdateWebAssets,
    UpdateNativeProject,
    BeforePrepareHook,
    AfterPrepareHook,
    Plugins,
    MetadataLoad,
    MetadataSave,
}

/// Failure configuration for an operation
#[derive(Debug, Clone)]
pub struct FailureConfig {
    /// Error message carried by the injected error
    pub message: String,
    /// Only fail for this platform (None = every platform)
    pub platform: Option<String>,
    /// Number of times to fail before succeeding (None = always fail)
    pub fail_count: Option<u32>,
}

impl FailureConfig {
    /// Create a config that always fails
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            platform: None,
            fail_count: None,
        }
    }

    /// Restrict the failure to one platform
    pub fn for_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Set fail count
    pub fn with_fail_count(mut self, count: u32) -> Self {
        self.fail_count = Some(count);
        self
    }
}

/// Failure injector for the fakes
#[derive(Debug, Default)]
pub struct FailureInjector {
    /// Per-operation failure configs
    configs: HashMap<Operation, FailureConfig>,
    /// Matching calls per operation (for fail_count tracking)
    call_counts: HashMap<Operation, u32>,
}

impl FailureInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a failure for an operation
    pub fn inject(&mut self, op: Operation, config: FailureConfig) {
        self.configs.insert(op, config);
        self.call_counts.insert(op, 0);
    }

    /// Inject an error for an operation
    pub fn inject_error(&mut self, op: Operation, message: impl Into<String>) {
        self.inject(op, FailureConfig::error(message));
    }

    /// Clear all failure injections
    pub fn clear(&mut self) {
        self.configs.clear();
        self.call_counts.clear();
    }

    /// Check if `op` on `platform` should fail.
    /// Returns the error message if so.
    pub fn check(&mut self, op: Operation, platform: Option<&str>) -> Option<String> {
        let config = self.configs.get(&op)?;
        if let Some(only) = &config.platform {
            if platform != Some(only.as_str()) {
                return None;
            }
        }

        let count = self.call_counts.entry(op).or_insert(0);
        *count += 1;

        if let Some(fail_limit) = config.fail_count {
            if *count > fail_limit {
                return None;
            }
        }

        Some(config.message.clone())
    }
}
