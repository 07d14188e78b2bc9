//! Error types for reading and writing configuration documents.

use std::io;
use std::path::PathBuf;

/// Errors raised while parsing or serializing a document.
///
/// The merge engine itself never fails; these only come from the XML layer.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("XML error at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("unexpected end of document: <{0}> is not closed")]
    UnexpectedEof(String),

    #[error("document has no root element")]
    NoRoot,

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write XML: {0}")]
    Write(String),
}

impl DocumentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;
