//! Error types.
//!
//! None of these ever reach the host: the controller catches them at its
//! boundary, logs them once and degrades to "the filter does nothing".

use crate::host::{ElementId, Scope};
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure categories of the filter feature.
#[derive(Debug, Error)]
pub enum Error {
    /// A storage read or write failed.
    #[error("failed to {op} persisted query {key:?}: {source}")]
    Storage {
        /// `"read"` or `"write"`.
        op: &'static str,
        /// Storage key involved.
        key: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// No storage backend is available in this context.
    #[error("persisted query storage is unavailable")]
    StorageUnavailable,

    /// The host document bridge could not be resolved.
    #[error("host document is unavailable")]
    HostUnavailable,

    /// Observing a different browsing context was refused.
    #[error("access denied while observing the {0} document")]
    AccessDenied(Scope),

    /// An element the caller referred to is no longer in the document.
    #[error("element {0} is not in the document")]
    ElementMissing(ElementId),
}

impl Error {
    /// Wraps an I/O failure from a storage operation.
    pub fn storage(op: &'static str, key: &str, source: std::io::Error) -> Self {
        Error::Storage {
            op,
            key: key.to_string(),
            source,
        }
    }
}
