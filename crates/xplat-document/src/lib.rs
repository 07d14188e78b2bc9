//! Configuration documents for cross-platform app projects.
//!
//! Provides the element tree used for project and platform configuration
//! files, XML reading/writing, and the merge engine that folds a project
//! document (with its `<platform>` overlays) into a platform document.

mod element;
mod error;
mod merge;
mod xml;

pub use element::{Attributes, Document, Element};
pub use error::{DocumentError, DocumentResult};
pub use merge::{
    merge_into, merge_into_with, SingletonTags, PLATFORM_NAME_ATTR, PLATFORM_TAG, SINGLETON_TAGS,
};
pub use xml::{parse_str, read_file, to_string, write_file};

/// Root element name of a freshly created configuration document.
pub const DEFAULT_ROOT: &str = "widget";

/// Create an empty configuration document with the default root.
pub fn empty_document() -> Document {
    Document::new(DEFAULT_ROOT)
}
