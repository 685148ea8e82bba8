//! Well-known type resolution.
//!
//! Well-known types live in the `google.protobuf` package. Seven of them are
//! boxed scalars ("wrappers") whose inner value is validated like a plain
//! scalar once presence has been established. The remaining well-known types
//! are opaque to validation and are never recursed into.

/// Package prefix shared by every well-known type.
pub const WKT_PACKAGE: &str = "google.protobuf.";

const WELL_KNOWN_TYPES: &[&str] = &[
    "Any",
    "Api",
    "BoolValue",
    "BytesValue",
    "DoubleValue",
    "Duration",
    "Empty",
    "Enum",
    "EnumValue",
    "Field",
    "Field.Cardinality",
    "Field.Kind",
    "FieldMask",
    "FloatValue",
    "Int32Value",
    "Int64Value",
    "ListValue",
    "Method",
    "Mixin",
    "NullValue",
    "Option",
    "SourceContext",
    "StringValue",
    "Struct",
    "Syntax",
    "Timestamp",
    "Type",
    "UInt32Value",
    "UInt64Value",
    "Value",
];

/// Scalar family a wrapper type boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapperKind {
    String,
    Integer,
    Float,
}

/// Returns the short name (`StringValue`) of a well-known type, if
/// `type_name` names one. Accepts `.google.protobuf.X` and `google.protobuf.X`.
fn short_name(type_name: &str) -> Option<&str> {
    let name = type_name.strip_prefix('.').unwrap_or(type_name);
    let short = name.strip_prefix(WKT_PACKAGE)?;
    WELL_KNOWN_TYPES
        .iter()
        .any(|known| *known == short)
        .then_some(short)
}

/// Returns `true` if `type_name` is any well-known type.
///
/// # Examples
///
/// ```
/// use fieldcheck_core::wkt::is_well_known;
///
/// assert!(is_well_known(".google.protobuf.Timestamp"));
/// assert!(!is_well_known(".shop.v1.Order"));
/// assert!(!is_well_known(".google.protobuf.NotAType"));
/// ```
pub fn is_well_known(type_name: &str) -> bool {
    short_name(type_name).is_some()
}

/// Resolves a wrapper type to the scalar family it boxes.
///
/// Returns `None` for non-wrapper well-known types, for `BoolValue` and
/// `BytesValue` (no rule family applies), and for every other type name.
///
/// # Examples
///
/// ```
/// use fieldcheck_core::wkt::{resolve_wrapper, WrapperKind};
///
/// assert_eq!(resolve_wrapper(".google.protobuf.StringValue"), Some(WrapperKind::String));
/// assert_eq!(resolve_wrapper(".google.protobuf.UInt64Value"), Some(WrapperKind::Integer));
/// assert_eq!(resolve_wrapper(".google.protobuf.FloatValue"), Some(WrapperKind::Float));
/// assert_eq!(resolve_wrapper(".google.protobuf.BoolValue"), None);
/// ```
pub fn resolve_wrapper(type_name: &str) -> Option<WrapperKind> {
    match short_name(type_name)? {
        "StringValue" => Some(WrapperKind::String),
        "Int32Value" | "Int64Value" | "UInt32Value" | "UInt64Value" => Some(WrapperKind::Integer),
        "FloatValue" | "DoubleValue" => Some(WrapperKind::Float),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unqualified_prefix_is_accepted() {
        assert_eq!(
            resolve_wrapper("google.protobuf.DoubleValue"),
            Some(WrapperKind::Float)
        );
    }

    #[test]
    fn test_int_in_user_type_name_is_not_a_wrapper() {
        // Only the exact wrapper names resolve; a user message that happens to
        // contain "Int" stays a plain embedded message.
        assert_eq!(resolve_wrapper(".shop.v1.PrintJob"), None);
        assert_eq!(resolve_wrapper(".shop.v1.Int32Value"), None);
    }

    #[test]
    fn test_nested_enum_names_are_well_known() {
        assert!(is_well_known(".google.protobuf.Field.Kind"));
        assert_eq!(resolve_wrapper(".google.protobuf.Field.Kind"), None);
    }
}
