//! Library error types.

use thiserror::Error;

/// Errors surfaced by menu selection, content lookup, and tag invocation.
#[derive(Debug, Error)]
pub enum Error {
    /// No top-level page matches the requested menu name. This is a
    /// content/configuration error and is fatal to the render that hit it.
    #[error("menu does not exist: no top-level page found with the title '{menu}'")]
    MenuNotFound { menu: String },

    /// A tag was invoked with a bad argument shape. This is a
    /// template-authoring bug, not a runtime condition to recover from.
    #[error("invalid tag usage: {0}")]
    InvalidUsage(String),

    /// A tag required an implicit value (e.g. the current page) that the
    /// render context does not carry.
    #[error("missing render context value: {0}")]
    MissingContext(String),

    /// A sub-template failed to render.
    #[error("template error")]
    Template(#[from] tera::Error),
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
