//! Error types for source generation.

use thiserror::Error;

/// Errors that can occur while rendering a compiled unit as Rust source.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// A message or field name has no Rust identifier form.
    #[error("cannot form a Rust identifier from {0:?}")]
    InvalidIdent(String),

    /// A transform name is not a Rust path.
    #[error("transform {0:?} is not a valid Rust path")]
    InvalidTransform(String),

    /// A regex rule refers to a pattern the unit's requirements do not list.
    #[error("pattern {0:?} is missing from the unit's requirements")]
    UnknownPattern(String),

    /// The assembled token stream did not parse as a Rust file.
    #[error("generated source does not parse: {0}")]
    Syntax(#[from] syn::Error),
}

/// Convenience alias for results with [`CodegenError`].
pub type Result<T> = std::result::Result<T, CodegenError>;
