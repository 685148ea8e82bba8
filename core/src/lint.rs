//! Schema set linting.
//!
//! Catches structural problems in a [`SchemaSet`] before any validator is
//! compiled: empty or duplicate names, regexes that do not compile, inverted
//! length bounds, and rules attached to fields they cannot apply to.
//!
//! # Examples
//!
//! ```
//! use fieldcheck_core::*;
//!
//! let set = SchemaSet::new().with_message(
//!     MessageSchema::new("Person").with_field(FieldSchema::string("name")),
//! );
//! assert!(lint_schema_set(&set).is_empty());
//!
//! // Invalid: the same field declared twice
//! let bad = SchemaSet::new().with_message(
//!     MessageSchema::new("Person")
//!         .with_field(FieldSchema::string("name"))
//!         .with_field(FieldSchema::string("name")),
//! );
//! assert!(lint_schema_set(&bad).iter().any(SchemaError::is_fatal));
//! ```

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

use crate::classify::{FieldKind, classify};
use crate::rules::Pattern;
use crate::{FieldSchema, MessageSchema, SchemaSet};

/// Rule family named in a [`SchemaError::RuleTypeMismatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFamily {
    String,
    Integer,
    Float,
}

impl fmt::Display for RuleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RuleFamily::String => "string",
            RuleFamily::Integer => "integer",
            RuleFamily::Float => "float",
        })
    }
}

/// Schema lint findings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Message name is empty or whitespace-only.
    #[error("message name cannot be empty")]
    EmptyMessageName,
    /// Two messages in the same set share a name.
    #[error("duplicate message in schema set: {0}")]
    DuplicateMessage(String),
    /// Field name is empty or whitespace-only.
    #[error("field name cannot be empty in message {0}")]
    EmptyFieldName(String),
    /// Two fields in the same message share a name.
    #[error("duplicate field in message {message}: {field}")]
    DuplicateField { message: String, field: String },
    /// A regex rule does not compile.
    #[error("invalid regex on {message}.{field}: {reason}")]
    InvalidRegex {
        message: String,
        field: String,
        reason: String,
    },
    /// `min_len` is greater than `max_len`, so no value can pass.
    #[error("min_len {min} exceeds max_len {max} on {message}.{field}")]
    InvertedLengthBounds {
        message: String,
        field: String,
        min: u64,
        max: u64,
    },
    /// Rules of a family the field's type does not support. They generate
    /// no checks.
    #[error("{family} rules on {message}.{field} do not apply to its type")]
    RuleTypeMismatch {
        message: String,
        field: String,
        family: RuleFamily,
    },
}

impl SchemaError {
    /// Returns `true` for findings that must block compilation.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SchemaError::RuleTypeMismatch { .. })
    }
}

/// Lints a full schema set.
///
/// Unlike validation of a message instance, linting collects every finding
/// so a schema author sees all problems at once.
pub fn lint_schema_set(set: &SchemaSet) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    let mut seen_messages: HashSet<&str> = HashSet::new();

    for message in &set.messages {
        let name = message.name.trim();
        if name.is_empty() {
            errors.push(SchemaError::EmptyMessageName);
            continue;
        }
        if !seen_messages.insert(name) {
            errors.push(SchemaError::DuplicateMessage(name.to_string()));
        }
        errors.extend(lint_message(message));
    }

    errors
}

/// Lints one message schema.
pub fn lint_message(message: &MessageSchema) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    let mut seen_fields: HashSet<&str> = HashSet::new();

    for field in &message.fields {
        let name = field.name.trim();
        if name.is_empty() {
            errors.push(SchemaError::EmptyFieldName(message.name.clone()));
            continue;
        }
        if !seen_fields.insert(name) {
            errors.push(SchemaError::DuplicateField {
                message: message.name.clone(),
                field: name.to_string(),
            });
        }
        lint_rule(message, field, &mut errors);
    }

    errors
}

fn lint_rule(message: &MessageSchema, field: &FieldSchema, errors: &mut Vec<SchemaError>) {
    let Some(rule) = &field.rule else {
        return;
    };
    if rule.do_not_validate {
        return;
    }

    if let Some(source) = &rule.regex {
        if let Err(err) = Pattern::new(source) {
            errors.push(SchemaError::InvalidRegex {
                message: message.name.clone(),
                field: field.name.clone(),
                reason: err.to_string(),
            });
        }
    }

    if let (Some(min), Some(max)) = (rule.min_len, rule.max_len) {
        if min > max {
            errors.push(SchemaError::InvertedLengthBounds {
                message: message.name.clone(),
                field: field.name.clone(),
                min,
                max,
            });
        }
    }

    let classification = classify(field);
    let accepted = match classification.kind() {
        Some(FieldKind::String) => Some(RuleFamily::String),
        Some(FieldKind::Integer) => Some(RuleFamily::Integer),
        Some(FieldKind::Float) => Some(RuleFamily::Float),
        // Embedded messages, maps and pass-through types take no scalar rules.
        Some(FieldKind::Message(_)) | None => None,
    };

    let configured = [
        (RuleFamily::String, rule.has_string_rules()),
        (RuleFamily::Integer, rule.has_integer_rules()),
        (RuleFamily::Float, rule.has_float_rules()),
    ];
    for (family, present) in configured {
        if present && accepted != Some(family) {
            errors.push(SchemaError::RuleTypeMismatch {
                message: message.name.clone(),
                field: field.name.clone(),
                family,
            });
        }
    }
}
