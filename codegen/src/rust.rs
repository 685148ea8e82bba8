//! Rust source generator.
//!
//! Renders a [`CompiledUnit`] as a Rust file meant to sit next to the
//! prost-generated message types (for example through `include!` in the
//! same module). The file contains:
//!
//! - `ValidationError` / `ValidationErrors` with `flatten`
//! - the helper predicates `is_valid_uuid`, `is_valid_email`, `is_valid_date`
//! - one `LazyLock<Regex>` static per distinct pattern
//! - per message, `validate_<name>(m: Option<&mut T>)` and `T::validate`
//!
//! Uses [`quote`] for quasi-quoting token streams and [`prettyplease`] for
//! formatting the output.

use std::collections::BTreeMap;

use fieldcheck_core::helpers::chrono_format;
use fieldcheck_core::rules::{
    Bound, Check, Emptiness, Mutation, StringCondition, StringRules, anchored,
};
use fieldcheck_core::template::MessageTemplate;
use fieldcheck_core::{Access, CompiledMessage, CompiledUnit, FieldPlan, FieldProgram, Shape};
use proc_macro2::{Ident, Literal, TokenStream};
use quote::quote;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{CodegenError, Result};
use crate::naming::{field_ident, pattern_ident, transform_path, type_path, validate_fn_ident};
use crate::support;

/// Stands in for `{field}` while splitting a template around the runtime path.
const FIELD_MARK: &str = "\u{0}";

/// Generates a complete Rust source file for a compiled unit.
///
/// The output is deterministic: the header carries a digest of the unit
/// instead of a timestamp, so regenerating an unchanged schema yields the
/// same bytes.
///
/// # Errors
///
/// Fails if a message, field or transform name has no Rust form.
///
/// # Examples
///
/// ```
/// use fieldcheck_core::*;
///
/// let set = SchemaSet::new().with_message(
///     MessageSchema::new("Person").with_field(
///         FieldSchema::string("name").with_rule(FieldValidationRule::default().min_len(3)),
///     ),
/// );
/// let unit = compile(&set).unwrap();
/// let source = fieldcheck_codegen::generate_rust(&unit).unwrap();
///
/// assert!(source.starts_with("// @generated"));
/// assert!(source.contains("pub fn validate_person("));
/// assert!(source.contains("impl Person"));
/// ```
pub fn generate_rust(unit: &CompiledUnit) -> Result<String> {
    let body = Generator::new(unit).generate()?;
    let source = unit
        .artifact
        .as_deref()
        .or(unit.package.as_deref())
        .unwrap_or("<unnamed>");
    let header = format!(
        "// @generated by fieldcheck. Do not edit.\n\
         // Source: {source}\n\
         // Digest: sha256:{}\n\
         // Requires the regex, uuid and chrono crates.\n\n",
        unit_digest(unit)
    );

    info!(
        source,
        messages = unit.messages.len(),
        bytes = header.len() + body.len(),
        "Generated validator source"
    );
    Ok(format!("{header}{body}"))
}

/// SHA-256 over everything that affects the generated code.
pub fn unit_digest(unit: &CompiledUnit) -> String {
    let description = format!(
        "{:?}|{:?}|{:?}",
        unit.package, unit.messages, unit.requirements
    );
    format!("{:x}", Sha256::digest(description.as_bytes()))
}

struct Generator<'a> {
    unit: &'a CompiledUnit,
    patterns: BTreeMap<&'a str, Ident>,
}

impl<'a> Generator<'a> {
    fn new(unit: &'a CompiledUnit) -> Self {
        let patterns = unit
            .requirements
            .patterns
            .iter()
            .enumerate()
            .map(|(index, source)| (source.as_str(), pattern_ident(index)))
            .collect();
        Self { unit, patterns }
    }

    fn generate(&self) -> Result<String> {
        let error_types = support::emit_error_types();
        let helpers = support::emit_helpers();
        let statics = self.emit_pattern_statics();
        let messages = self
            .unit
            .messages
            .iter()
            .map(|message| self.emit_message(message))
            .collect::<Result<Vec<_>>>()?;

        let file_tokens = quote! {
            #error_types
            #helpers
            #(#statics)*
            #(#messages)*
        };

        let syntax_tree: syn::File = syn::parse2(file_tokens)?;
        Ok(prettyplease::unparse(&syntax_tree))
    }

    fn emit_pattern_statics(&self) -> Vec<TokenStream> {
        self.patterns
            .iter()
            .map(|(source, ident)| {
                let anchored = anchored(source);
                quote! {
                    static #ident: std::sync::LazyLock<regex::Regex> = std::sync::LazyLock::new(|| {
                        regex::Regex::new(#anchored).expect("pattern is checked when the schema is compiled")
                    });
                }
            })
            .collect()
    }

    fn emit_message(&self, message: &CompiledMessage) -> Result<TokenStream> {
        let ty = type_path(&message.name)?;
        let func = validate_fn_ident(&message.name)?;
        let exit = Exit {
            stop_on_first_error: message.stop_on_first_error,
        };
        let fields = message
            .fields
            .iter()
            .map(|field| self.emit_field(field, exit))
            .collect::<Result<Vec<_>>>()?;
        let doc = format!(" Validates a `{}` message.", message.name);

        Ok(quote! {
            #[doc = #doc]
            #[allow(unused_mut, unused_variables)]
            pub fn #func(m: Option<&mut #ty>) -> Option<ValidationErrors> {
                let Some(m) = m else {
                    return Some(ValidationErrors(vec![ValidationError::nil_message()]));
                };
                let mut errors: Vec<ValidationError> = Vec::new();
                #(#fields)*
                if errors.is_empty() {
                    None
                } else {
                    Some(ValidationErrors(errors))
                }
            }

            impl #ty {
                /// Validates this message, normalizing string fields in place.
                pub fn validate(&mut self) -> Option<ValidationErrors> {
                    #func(Some(self))
                }
            }
        })
    }

    fn emit_field(&self, field: &FieldPlan, exit: Exit) -> Result<TokenStream> {
        if field.is_skipped() {
            return Ok(TokenStream::new());
        }
        let name = field_ident(&field.name)?;
        let label = field.name.as_str();
        let site = match field.shape {
            Shape::Single => Site::Field(label),
            Shape::Repeated => Site::Element(label),
        };

        let tokens = match &field.program {
            FieldProgram::Skip(_) => TokenStream::new(),
            FieldProgram::String(rules) => {
                let body = self.string_body(rules, site, exit)?;
                match (field.shape, field.access) {
                    (Shape::Single, Access::Direct) => quote! {
                        {
                            let value = &mut m.#name;
                            #body
                        }
                    },
                    (Shape::Single, Access::Wrapper) => quote! {
                        if let Some(value) = m.#name.as_mut() {
                            #body
                        }
                    },
                    (Shape::Repeated, _) => quote! {
                        for (i, value) in m.#name.iter_mut().enumerate() {
                            #body
                        }
                    },
                }
            }
            FieldProgram::Integer(rules) => {
                let body = numeric_body(&rules.checks, site, exit, int_literal);
                numeric_access(field, &name, quote!(i128), body)
            }
            FieldProgram::Float(rules) => {
                let body = numeric_body(&rules.checks, site, exit, float_literal);
                numeric_access(field, &name, quote!(f64), body)
            }
            FieldProgram::Message { type_name, message } => {
                let Some(target) = self.unit.message(type_name) else {
                    debug!(
                        message = %type_name,
                        field = %field.name,
                        "Embedded message has no validator in this unit, skipping"
                    );
                    return Ok(TokenStream::new());
                };
                let func = validate_fn_ident(&target.name)?;
                let push = exit.push(site.error(message, |path, text| {
                    quote!(ValidationError::nested(#path, #text, nested))
                }));
                match field.shape {
                    Shape::Single => quote! {
                        if let Some(sub) = m.#name.as_mut() {
                            if let Some(nested) = #func(Some(sub)) {
                                #push
                            }
                        }
                    },
                    Shape::Repeated => quote! {
                        for (i, sub) in m.#name.iter_mut().enumerate() {
                            if let Some(nested) = #func(Some(sub)) {
                                #push
                            }
                        }
                    },
                }
            }
        };
        Ok(tokens)
    }

    fn string_body(&self, rules: &StringRules, site: Site<'_>, exit: Exit) -> Result<TokenStream> {
        let mutations = rules
            .mutations
            .iter()
            .map(|mutation| match mutation {
                Mutation::Transform(function) => {
                    let function = transform_path(function)?;
                    Ok(quote! { *value = #function(value.as_str()); })
                }
                Mutation::Trim => Ok(quote! { *value = value.trim().to_string(); }),
                Mutation::Lowercase => Ok(quote! { *value = value.to_lowercase(); }),
                Mutation::Uppercase => Ok(quote! { *value = value.to_uppercase(); }),
            })
            .collect::<Result<Vec<_>>>()?;

        let checks = rules
            .checks
            .iter()
            .map(|check| {
                let condition = self.string_condition(&check.condition)?;
                let push = exit.push(site.violation(&check.message));
                Ok(quote! {
                    if !(#condition) {
                        #push
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let gated = match &rules.emptiness {
            Emptiness::Unconstrained => quote! { #(#checks)* },
            Emptiness::Forbidden(message) => {
                let push = exit.push(site.violation(message));
                if checks.is_empty() {
                    quote! {
                        if value.is_empty() {
                            #push
                        }
                    }
                } else {
                    quote! {
                        if value.is_empty() {
                            #push
                        } else {
                            #(#checks)*
                        }
                    }
                }
            }
            Emptiness::Allowed if checks.is_empty() => TokenStream::new(),
            Emptiness::Allowed => quote! {
                if !value.is_empty() {
                    #(#checks)*
                }
            },
        };

        Ok(quote! {
            #(#mutations)*
            #gated
        })
    }

    fn string_condition(&self, condition: &StringCondition) -> Result<TokenStream> {
        let tokens = match condition {
            StringCondition::Equals(expected) => quote!(value.as_str() == #expected),
            StringCondition::Contains(needle) => quote!(value.contains(#needle)),
            StringCondition::Regex(pattern) => {
                let ident = self
                    .patterns
                    .get(pattern.source())
                    .ok_or_else(|| CodegenError::UnknownPattern(pattern.source().to_string()))?;
                quote!(#ident.is_match(value.as_str()))
            }
            StringCondition::MinLen(min) => {
                let min = Literal::u64_unsuffixed(*min);
                quote!(value.chars().count() >= #min)
            }
            StringCondition::MaxLen(max) => {
                let max = Literal::u64_unsuffixed(*max);
                quote!(value.chars().count() <= #max)
            }
            StringCondition::EqLen(len) => {
                let len = Literal::u64_unsuffixed(*len);
                quote!(value.chars().count() == #len)
            }
            StringCondition::Uuid => quote!(is_valid_uuid(value.as_str())),
            StringCondition::Email => quote!(is_valid_email(value.as_str())),
            StringCondition::Date(layout) => {
                let format = chrono_format(layout);
                quote!(is_valid_date(value.as_str(), #format))
            }
        };
        Ok(tokens)
    }
}

/// Binds `value` to the widened number for each access shape.
fn numeric_access(field: &FieldPlan, name: &Ident, widen: TokenStream, body: TokenStream) -> TokenStream {
    match (field.shape, field.access) {
        (Shape::Single, Access::Direct) => quote! {
            {
                let value = #widen::from(m.#name);
                #body
            }
        },
        (Shape::Single, Access::Wrapper) => quote! {
            if let Some(value) = m.#name {
                let value = #widen::from(value);
                #body
            }
        },
        (Shape::Repeated, _) => quote! {
            for (i, value) in m.#name.iter().enumerate() {
                let value = #widen::from(*value);
                #body
            }
        },
    }
}

fn numeric_body<T: Copy>(
    checks: &[Check<Bound<T>>],
    site: Site<'_>,
    exit: Exit,
    literal: fn(T) -> TokenStream,
) -> TokenStream {
    checks
        .iter()
        .map(|check| {
            let bound = literal(check.condition.value());
            let condition = match check.condition {
                Bound::Eq(_) => quote!(value == #bound),
                Bound::Lte(_) => quote!(value <= #bound),
                Bound::Gte(_) => quote!(value >= #bound),
            };
            let push = exit.push(site.violation(&check.message));
            quote! {
                if !(#condition) {
                    #push
                }
            }
        })
        .collect()
}

fn int_literal(bound: i64) -> TokenStream {
    let magnitude = Literal::u64_unsuffixed(bound.unsigned_abs());
    if bound < 0 {
        quote!(-#magnitude)
    } else {
        quote!(#magnitude)
    }
}

fn float_literal(bound: f64) -> TokenStream {
    if bound.is_nan() {
        return quote!(f64::NAN);
    }
    if bound.is_infinite() {
        return if bound > 0.0 {
            quote!(f64::INFINITY)
        } else {
            quote!(f64::NEG_INFINITY)
        };
    }
    let magnitude = Literal::f64_unsuffixed(bound.abs());
    if bound < 0.0 {
        quote!(-#magnitude)
    } else {
        quote!(#magnitude)
    }
}

/// How a failure leaves the validator.
#[derive(Clone, Copy)]
struct Exit {
    stop_on_first_error: bool,
}

impl Exit {
    fn push(self, error: TokenStream) -> TokenStream {
        if self.stop_on_first_error {
            quote! {
                errors.push(#error);
                return Some(ValidationErrors(errors));
            }
        } else {
            quote! { errors.push(#error); }
        }
    }
}

/// Where a failure is reported: a field, or an element of a repeated field
/// whose index `i` is only known at run time.
#[derive(Clone, Copy)]
enum Site<'a> {
    Field(&'a str),
    Element(&'a str),
}

impl Site<'_> {
    fn violation(self, template: &MessageTemplate) -> TokenStream {
        self.error(template, |path, text| {
            quote!(ValidationError::violation(#path, #text))
        })
    }

    fn error(
        self,
        template: &MessageTemplate,
        build: impl Fn(TokenStream, TokenStream) -> TokenStream,
    ) -> TokenStream {
        match self {
            Site::Field(label) => {
                let text = template.render(label);
                build(quote!(#label), quote!(#text))
            }
            Site::Element(label) => {
                let rendered = template.render(FIELD_MARK);
                let parts: Vec<&str> = rendered.split(FIELD_MARK).collect();
                let text = match parts.as_slice() {
                    [only] => quote!(#only),
                    parts => quote!([#(#parts),*].join(path.as_str())),
                };
                let error = build(quote!(path.clone()), text);
                quote! {
                    {
                        let path = format!("{}[{}]", #label, i);
                        #error
                    }
                }
            }
        }
    }
}
