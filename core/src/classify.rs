//! Field classification.
//!
//! Every field lands in exactly one [`Classification`]. Wrapper types are
//! resolved to a single scalar family first, so a field is never both
//! string-like and integer-like. Classification is total: anything the
//! validator has no rules for becomes [`Classification::PassThrough`].

use crate::wkt::{self, WrapperKind};
use crate::{FieldSchema, FieldType, ScalarKind};

/// Rule family or recursion target of a field's values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Float,
    /// A non-wrapper embedded message; the type name is kept as declared.
    Message(String),
}

/// How a value is reached from its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The field holds the value itself.
    Direct,
    /// The field holds an optional wrapper; checks only run when it is
    /// present and target the wrapper's inner value.
    Wrapper,
}

/// Result of classifying one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A single value.
    Single { kind: FieldKind, access: Access },
    /// A sequence of values, validated element by element.
    Repeated { kind: FieldKind, access: Access },
    /// A map field. Maps are skipped.
    Map,
    /// No rule family applies (bool, bytes, enum, opaque well-known types).
    PassThrough,
}

impl Classification {
    /// Returns the value kind for single and repeated fields.
    pub fn kind(&self) -> Option<&FieldKind> {
        match self {
            Self::Single { kind, .. } | Self::Repeated { kind, .. } => Some(kind),
            Self::Map | Self::PassThrough => None,
        }
    }
}

/// Classifies a field.
///
/// Decision order: maps first, then well-known wrappers (resolved to their
/// boxed scalar with [`Access::Wrapper`]), then other well-known types
/// (pass-through), then embedded messages, then primitive kinds. A repeated
/// flag wraps whatever base classification results.
///
/// # Examples
///
/// ```
/// use fieldcheck_core::*;
///
/// let nickname = FieldSchema::message("nickname", ".google.protobuf.StringValue");
/// assert_eq!(
///     classify(&nickname),
///     Classification::Single { kind: FieldKind::String, access: Access::Wrapper },
/// );
///
/// let scores = FieldSchema::scalar("scores", ScalarKind::Fixed64).repeated();
/// assert_eq!(
///     classify(&scores),
///     Classification::Repeated { kind: FieldKind::Integer, access: Access::Direct },
/// );
/// ```
pub fn classify(field: &FieldSchema) -> Classification {
    let (kind, access) = match &field.field_type {
        FieldType::Map { .. } => return Classification::Map,
        FieldType::Message(type_name) => match wkt::resolve_wrapper(type_name) {
            Some(wrapper) => (wrapper_kind(wrapper), Access::Wrapper),
            None if wkt::is_well_known(type_name) => return Classification::PassThrough,
            None => (FieldKind::Message(type_name.clone()), Access::Direct),
        },
        FieldType::Scalar(scalar) => match scalar_kind(*scalar) {
            Some(kind) => (kind, Access::Direct),
            None => return Classification::PassThrough,
        },
    };

    if field.repeated {
        Classification::Repeated { kind, access }
    } else {
        Classification::Single { kind, access }
    }
}

fn wrapper_kind(wrapper: WrapperKind) -> FieldKind {
    match wrapper {
        WrapperKind::String => FieldKind::String,
        WrapperKind::Integer => FieldKind::Integer,
        WrapperKind::Float => FieldKind::Float,
    }
}

fn scalar_kind(scalar: ScalarKind) -> Option<FieldKind> {
    if scalar.is_string() {
        Some(FieldKind::String)
    } else if scalar.is_integer() {
        Some(FieldKind::Integer)
    } else if scalar.is_float() {
        Some(FieldKind::Float)
    } else {
        None
    }
}
