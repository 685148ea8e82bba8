//! Validation results and compilation errors.
//!
//! A generated validator reports failures as data: a [`ValidationErrors`]
//! list whose entries may themselves carry the nested failures of an
//! embedded message. Nothing is flattened while validating; [`flatten`] is a
//! separate depth-first query over the finished tree.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lint::SchemaError;

/// Field path reported when validation is invoked on an absent message.
pub const NIL_MESSAGE_FIELD: &str = "message";
/// Message reported when validation is invoked on an absent message.
pub const NIL_MESSAGE: &str = "message is nil, validation can not proceed";

/// What a [`ValidationError`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Validation was invoked on an absent top-level message.
    NilMessage,
    /// One rule failed on one field or element.
    FieldConstraintViolation,
    /// An embedded message failed; its errors are nested.
    NestedValidationFailure,
}

/// One validation failure.
///
/// # Examples
///
/// ```
/// use fieldcheck_core::{ErrorKind, ValidationError, ValidationErrors};
///
/// let leaf = ValidationError::violation("street", "street can not be an empty string");
/// let nested = ValidationError::nested(
///     "address",
///     "address is invalid",
///     ValidationErrors::from(vec![leaf]),
/// );
/// assert_eq!(nested.kind, ErrorKind::NestedValidationFailure);
/// assert_eq!(nested.errors.len(), 1);
/// assert_eq!(nested.to_string(), "address is invalid");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Field path, e.g. `name`, `tags[1]`, `address`.
    pub field: String,
    /// Resolved, human-readable message.
    pub message: String,
    pub kind: ErrorKind,
    /// Failures of an embedded message, in the sub-message's own order.
    #[serde(default, skip_serializing_if = "ValidationErrors::is_empty")]
    pub errors: ValidationErrors,
}

impl ValidationError {
    /// The single error reported for an absent top-level message.
    pub fn nil_message() -> Self {
        Self {
            field: NIL_MESSAGE_FIELD.to_string(),
            message: NIL_MESSAGE.to_string(),
            kind: ErrorKind::NilMessage,
            errors: ValidationErrors::new(),
        }
    }

    /// A failed rule on one field or element.
    pub fn violation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            kind: ErrorKind::FieldConstraintViolation,
            errors: ValidationErrors::new(),
        }
    }

    /// A failed embedded message carrying its own error list.
    pub fn nested(
        field: impl Into<String>,
        message: impl Into<String>,
        errors: ValidationErrors,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            kind: ErrorKind::NestedValidationFailure,
            errors,
        }
    }
}

/// Ordered list of validation failures. Empty means valid.
///
/// `Display` shows the first failure, which is the most useful single line
/// for callers that only log the error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(transparent)]
#[error("{}", summary(.0))]
pub struct ValidationErrors(Vec<ValidationError>);

fn summary(errors: &[ValidationError]) -> &str {
    errors
        .first()
        .map(|error| error.message.as_str())
        .unwrap_or("no validation errors")
}

impl ValidationErrors {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a failure.
    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Returns the number of top-level failures (nested ones not counted).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no failures.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the first failure.
    pub fn first(&self) -> Option<&ValidationError> {
        self.0.first()
    }

    /// Iterates over top-level failures.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// Returns the failures as a slice.
    pub fn as_slice(&self) -> &[ValidationError] {
        &self.0
    }

    /// Consumes the list into its entries.
    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0
    }

    /// See [`flatten`].
    pub fn flatten(&self) -> (Vec<String>, Vec<String>) {
        flatten(self)
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Walks an error tree depth-first in encounter order and returns parallel
/// lists of field paths and messages.
///
/// Every node is reported, parents before their nested errors. Nested paths
/// are qualified with their ancestors' paths joined by `.`.
///
/// # Examples
///
/// ```
/// use fieldcheck_core::{flatten, ValidationError, ValidationErrors};
///
/// let errors = ValidationErrors::from(vec![
///     ValidationError::violation("name", "name must be at least 3 characters long"),
///     ValidationError::nested(
///         "items[1]",
///         "items[1] is invalid",
///         ValidationErrors::from(vec![ValidationError::violation("sku", "sku can not be an empty string")]),
///     ),
///     ValidationError::violation("age", "age must be greater than or equal to 0"),
/// ]);
///
/// let (fields, messages) = flatten(&errors);
/// assert_eq!(fields, ["name", "items[1]", "items[1].sku", "age"]);
/// assert_eq!(messages[2], "sku can not be an empty string");
/// ```
pub fn flatten(errors: &ValidationErrors) -> (Vec<String>, Vec<String>) {
    let mut fields = Vec::new();
    let mut messages = Vec::new();
    flatten_into(errors, None, &mut fields, &mut messages);
    (fields, messages)
}

fn flatten_into(
    errors: &ValidationErrors,
    prefix: Option<&str>,
    fields: &mut Vec<String>,
    messages: &mut Vec<String>,
) {
    for error in errors {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{}", error.field),
            None => error.field.clone(),
        };
        fields.push(path.clone());
        messages.push(error.message.clone());
        flatten_into(&error.errors, Some(&path), fields, messages);
    }
}

/// Errors raised while compiling a schema set or looking up a validator.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The schema set failed linting with at least one fatal finding.
    #[error("invalid schema: {}", join_findings(.0))]
    InvalidSchema(Vec<SchemaError>),

    /// A regex rule does not compile.
    #[error("invalid regex on field {field}: {source}")]
    InvalidRegex {
        field: String,
        #[source]
        source: regex::Error,
    },

    /// No compiled validator exists for the requested message.
    #[error("no validator compiled for message: {0}")]
    UnknownMessage(String),
}

fn join_findings(findings: &[SchemaError]) -> String {
    findings
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
