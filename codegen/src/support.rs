//! Items every generated file carries: the error types the validators
//! return and the shared helper predicates.
//!
//! Helpers are emitted whether or not a rule references them, so every
//! generated file exposes the same surface.

use fieldcheck_core::helpers::EMAIL_PATTERN;
use fieldcheck_core::{Helper, NIL_MESSAGE, NIL_MESSAGE_FIELD};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

pub(crate) fn emit_error_types() -> TokenStream {
    quote! {
        /// What a [`ValidationError`] reports.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum ValidationErrorKind {
            NilMessage,
            FieldConstraintViolation,
            NestedValidationFailure,
        }

        /// One validation failure; embedded message failures are nested.
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct ValidationError {
            pub field: String,
            pub message: String,
            pub kind: ValidationErrorKind,
            pub errors: ValidationErrors,
        }

        #[allow(dead_code)]
        impl ValidationError {
            fn nil_message() -> Self {
                Self {
                    field: #NIL_MESSAGE_FIELD.to_string(),
                    message: #NIL_MESSAGE.to_string(),
                    kind: ValidationErrorKind::NilMessage,
                    errors: ValidationErrors::default(),
                }
            }

            fn violation(field: impl Into<String>, message: impl Into<String>) -> Self {
                Self {
                    field: field.into(),
                    message: message.into(),
                    kind: ValidationErrorKind::FieldConstraintViolation,
                    errors: ValidationErrors::default(),
                }
            }

            fn nested(
                field: impl Into<String>,
                message: impl Into<String>,
                errors: ValidationErrors,
            ) -> Self {
                Self {
                    field: field.into(),
                    message: message.into(),
                    kind: ValidationErrorKind::NestedValidationFailure,
                    errors,
                }
            }
        }

        impl std::fmt::Display for ValidationError {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.message)
            }
        }

        impl std::error::Error for ValidationError {}

        /// Ordered validation failures.
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct ValidationErrors(pub Vec<ValidationError>);

        impl ValidationErrors {
            /// Depth-first field paths and messages; nested paths are
            /// qualified with their ancestors joined by `.`.
            pub fn flatten(&self) -> (Vec<String>, Vec<String>) {
                fn walk(
                    errors: &ValidationErrors,
                    prefix: Option<&str>,
                    fields: &mut Vec<String>,
                    messages: &mut Vec<String>,
                ) {
                    for error in &errors.0 {
                        let path = match prefix {
                            Some(prefix) => format!("{}.{}", prefix, error.field),
                            None => error.field.clone(),
                        };
                        fields.push(path.clone());
                        messages.push(error.message.clone());
                        walk(&error.errors, Some(&path), fields, messages);
                    }
                }

                let mut fields = Vec::new();
                let mut messages = Vec::new();
                walk(self, None, &mut fields, &mut messages);
                (fields, messages)
            }
        }

        impl std::fmt::Display for ValidationErrors {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self.0.first() {
                    Some(error) => f.write_str(&error.message),
                    None => f.write_str("no validation errors"),
                }
            }
        }

        impl std::error::Error for ValidationErrors {}
    }
}

pub(crate) fn emit_helpers() -> TokenStream {
    Helper::ALL.into_iter().map(emit_helper).collect()
}

fn emit_helper(helper: Helper) -> TokenStream {
    let name = format_ident!("{}", helper.symbol());
    match helper {
        Helper::Uuid => quote! {
            #[allow(dead_code)]
            fn #name(value: &str) -> bool {
                uuid::Uuid::parse_str(value).is_ok()
            }
        },
        Helper::Email => quote! {
            #[allow(dead_code)]
            static EMAIL_RE: std::sync::LazyLock<regex::Regex> = std::sync::LazyLock::new(|| {
                regex::Regex::new(#EMAIL_PATTERN).expect("static regex must compile")
            });

            #[allow(dead_code)]
            fn #name(value: &str) -> bool {
                value.len() <= 254 && EMAIL_RE.is_match(value)
            }
        },
        Helper::Date => quote! {
            #[allow(dead_code)]
            fn #name(value: &str, format: &str) -> bool {
                if let Ok(datetime) = chrono::NaiveDateTime::parse_from_str(value, format) {
                    return datetime.format(format).to_string() == value;
                }
                match chrono::NaiveDate::parse_from_str(value, format) {
                    Ok(date) => date.format(format).to_string() == value,
                    Err(_) => false,
                }
            }
        },
    }
}
