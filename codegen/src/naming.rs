//! Rust names for schema entities, following prost's conventions.
//!
//! Message types are `UpperCamelCase`, fields are `snake_case`, nested
//! messages live in a `snake_case` module named after their parent, and
//! field names that collide with keywords become raw identifiers.

use convert_case::{Case, Casing};
use proc_macro2::Ident;

use crate::error::{CodegenError, Result};

/// Identifier of a struct field.
///
/// # Examples
///
/// ```
/// use fieldcheck_codegen::naming::field_ident;
///
/// assert_eq!(field_ident("DisplayName").unwrap().to_string(), "display_name");
/// assert_eq!(field_ident("type").unwrap().to_string(), "r#type");
/// assert!(field_ident("").is_err());
/// ```
pub fn field_ident(name: &str) -> Result<Ident> {
    ident(&name.to_case(Case::Snake), name)
}

/// Path of a message's struct relative to the generated file's module.
pub fn type_path(local_name: &str) -> Result<syn::Path> {
    let segments: Vec<&str> = local_name.split('.').collect();
    let Some((last, parents)) = segments.split_last() else {
        return Err(CodegenError::InvalidIdent(local_name.to_string()));
    };

    let mut parts = Vec::with_capacity(segments.len());
    for parent in parents {
        parts.push(ident(&parent.to_case(Case::Snake), local_name)?.to_string());
    }
    parts.push(ident(&last.to_case(Case::Pascal), local_name)?.to_string());

    syn::parse_str(&parts.join("::")).map_err(|_| CodegenError::InvalidIdent(local_name.to_string()))
}

/// Name of the free validation function for a message.
///
/// # Examples
///
/// ```
/// use fieldcheck_codegen::naming::validate_fn_ident;
///
/// assert_eq!(validate_fn_ident("LineItem").unwrap().to_string(), "validate_line_item");
/// assert_eq!(validate_fn_ident("Order.Line").unwrap().to_string(), "validate_order_line");
/// ```
pub fn validate_fn_ident(local_name: &str) -> Result<Ident> {
    let snake = local_name
        .split('.')
        .map(|segment| segment.to_case(Case::Snake))
        .collect::<Vec<_>>()
        .join("_");
    ident(&format!("validate_{snake}"), local_name)
}

/// Identifier of the static holding the pattern at `index`.
pub fn pattern_ident(index: usize) -> Ident {
    quote::format_ident!("PATTERN_{}", index)
}

/// Parses a transform name as a callable path.
pub fn transform_path(name: &str) -> Result<syn::Path> {
    syn::parse_str(name).map_err(|_| CodegenError::InvalidTransform(name.to_string()))
}

fn ident(candidate: &str, original: &str) -> Result<Ident> {
    if let Ok(ident) = syn::parse_str::<Ident>(candidate) {
        return Ok(ident);
    }
    // Keywords are rejected as plain identifiers but accepted in raw form.
    syn::parse_str::<Ident>(&format!("r#{candidate}"))
        .map_err(|_| CodegenError::InvalidIdent(original.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::ToTokens;

    #[test]
    fn test_type_path_for_nested_message() {
        let path = type_path("Order.LineItem").unwrap();
        assert_eq!(path.to_token_stream().to_string(), "order :: LineItem");
    }

    #[test]
    fn test_type_path_camel_cases() {
        let path = type_path("person").unwrap();
        assert_eq!(path.to_token_stream().to_string(), "Person");
    }

    #[test]
    fn test_unrepresentable_names_are_rejected() {
        assert!(matches!(field_ident("self"), Err(CodegenError::InvalidIdent(_))));
        assert!(type_path("").is_err());
    }

    #[test]
    fn test_transform_paths() {
        assert!(transform_path("crate::normalize::slug").is_ok());
        assert!(transform_path("slug").is_ok());
        assert!(matches!(
            transform_path("not a path"),
            Err(CodegenError::InvalidTransform(_))
        ));
    }
}
