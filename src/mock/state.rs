//! Shared event log and in-memory state of the fakes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use xplat_document::Document;

use super::failure::{FailureConfig, FailureInjector, Operation};
use crate::hooks::{HookEvent, HookPayload};
use crate::metadata::PlatformMetadata;

/// A collaborator call, in the order it happened
#[derive(Debug, Clone, PartialEq)]
pub enum MockEvent {
    Hook {
        event: HookEvent,
        payload: HookPayload,
    },
    WebAssets {
        platform: String,
    },
    NativeProject {
        platform: String,
        document: Document,
    },
    Plugins {
        platform: String,
    },
    MetadataSaved {
        platform: String,
    },
}

impl MockEvent {
    /// Short label such as `native:ios` or `hook:before_prepare`
    pub fn label(&self) -> String {
        match self {
            MockEvent::Hook { event, .. } => format!("hook:{}", event),
            MockEvent::WebAssets { platform } => format!("web:{}", platform),
            MockEvent::NativeProject { platform, .. } => format!("native:{}", platform),
            MockEvent::Plugins { platform } => format!("plugins:{}", platform),
            MockEvent::MetadataSaved { platform } => format!("metadata:{}", platform),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    events: Vec<MockEvent>,
    failures: FailureInjector,
    metadata: HashMap<String, PlatformMetadata>,
}

/// State shared by every fake of one test
#[derive(Debug, Clone, Default)]
pub struct MockState {
    inner: Arc<Mutex<Inner>>,
}

impl MockState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, event: MockEvent) {
        self.lock().events.push(event);
    }

    /// Every recorded call so far
    pub fn events(&self) -> Vec<MockEvent> {
        self.lock().events.clone()
    }

    /// Labels of every recorded call so far
    pub fn labels(&self) -> Vec<String> {
        self.lock().events.iter().map(MockEvent::label).collect()
    }

    /// Payloads handed to hooks for `event`
    pub fn hook_payloads(&self, event: HookEvent) -> Vec<HookPayload> {
        self.lock()
            .events
            .iter()
            .filter_map(|e| match e {
                MockEvent::Hook { event: fired, payload } if *fired == event => {
                    Some(payload.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Documents handed to native project updates for `platform`
    pub fn native_documents(&self, platform: &str) -> Vec<Document> {
        self.lock()
            .events
            .iter()
            .filter_map(|e| match e {
                MockEvent::NativeProject {
                    platform: p,
                    document,
                } if p == platform => Some(document.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn inject(&self, op: Operation, config: FailureConfig) {
        self.lock().failures.inject(op, config);
    }

    pub fn inject_error(&self, op: Operation, message: impl Into<String>) {
        self.lock().failures.inject_error(op, message);
    }

    pub(crate) fn check(&self, op: Operation, platform: Option<&str>) -> Option<String> {
        self.lock().failures.check(op, platform)
    }

    pub fn metadata(&self, platform: &str) -> Option<PlatformMetadata> {
        self.lock().metadata.get(platform).cloned()
    }

    pub(crate) fn store_metadata(&self, metadata: PlatformMetadata) {
        self.lock()
            .metadata
            .insert(metadata.platform.clone(), metadata);
    }
}
