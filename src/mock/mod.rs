//! Recording fakes for the prepare collaborators
//!
//! Every fake shares one [`MockState`]: an ordered event log, in-memory
//! platform metadata and a [`FailureInjector`]. Documents are still read
//! from and written to disk, so tests point the registry at a scratch
//! project containing a `config.xml`.
//!
//! ```ignore
//! let state = MockState::new();
//! let preparer = mock::preparer(&state, Some(root), &["android", "ios"]);
//! state.inject_error(Operation::Plugins, "boom");
//! ```

mod failure;
mod fakes;
mod state;

pub use failure::{FailureConfig, FailureInjector, Operation};
pub use fakes::{
    MockHooks, MockMetadataStore, MockPlatform, MockPlatformFactory, MockPlugins, MockRegistry,
};
pub use state::{MockEvent, MockState};

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::PrepareSettings;
use crate::prepare::Preparer;

/// A [`Preparer`] wired entirely to fakes sharing `state`, with default
/// settings.
pub fn preparer(state: &MockState, root: Option<PathBuf>, platforms: &[&str]) -> Preparer {
    Preparer::new(
        PrepareSettings::default(),
        Arc::new(MockRegistry::new(state, root, platforms)),
        Arc::new(MockPlatformFactory::new(state)),
        Arc::new(MockHooks::new(state)),
        Arc::new(MockPlugins::new(state)),
        Arc::new(MockMetadataStore::new(state)),
    )
}
