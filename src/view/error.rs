//! View error types
//!
//! Every failing view operation leaves the list and its mount untouched,
//! so callers can log the error and keep going.

use thiserror::Error;

/// Errors reported by [`OrderedList`](super::OrderedList) operations
#[derive(Error, Debug)]
pub enum ViewError {
    /// Insert of a token that is already present
    #[error("Duplicate token: {0}")]
    DuplicateToken(String),

    /// Update or remove of a token that is not present
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    /// The rendered node expected for a token is gone from the mount
    #[error("Missing mount node: {key}")]
    MissingMountNode { key: String },

    /// The renderer refused to produce a node for a record
    #[error("Render failed for {token}: {source}")]
    Render {
        token: String,
        #[source]
        source: RenderError,
    },
}

/// Failure raised by a renderer function
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct RenderError(pub String);

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Result type alias for view operations
pub type ViewResult<T> = Result<T, ViewError>;
