//! Error-message templating.
//!
//! Templates carry `{name}` placeholders that are replaced literally from an
//! explicit placeholder map. Unknown placeholders are left untouched so a
//! template can be rendered in stages: `{value}` when a rule is compiled,
//! `{field}` once the element path is known.

use std::collections::BTreeMap;

/// Placeholder for the field path.
pub const FIELD: &str = "field";
/// Placeholder for the rule's bound value.
pub const VALUE: &str = "value";

/// Substitutes `{name}` placeholders in a single left-to-right pass.
///
/// Substituted text is never rescanned, so a value that itself contains
/// `{field}` is emitted verbatim.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use fieldcheck_core::template::render;
///
/// let values = BTreeMap::from([("field", "name"), ("value", "3")]);
/// assert_eq!(
///     render("{field} must be at least {value} characters long", &values),
///     "name must be at least 3 characters long",
/// );
/// assert_eq!(render("{other} stays", &values), "{other} stays");
/// ```
pub fn render(template: &str, values: &BTreeMap<&str, &str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        if name.contains('{') {
            // "{{field}": emit the stray brace and rescan from the next one.
            out.push('{');
            rest = after;
            continue;
        }
        match values.get(name) {
            Some(value) => out.push_str(value),
            None => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

/// A failure message whose `{value}` is fixed at compile time and whose
/// `{field}` is filled in per element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    template: String,
    value: String,
}

impl MessageTemplate {
    /// Uses `custom` when present, otherwise `default`.
    pub fn new(custom: Option<&str>, default: &str, value: impl Into<String>) -> Self {
        Self {
            template: custom.unwrap_or(default).to_string(),
            value: value.into(),
        }
    }

    /// Renders the message for one field path.
    pub fn render(&self, field: &str) -> String {
        let values = BTreeMap::from([(FIELD, field), (VALUE, self.value.as_str())]);
        render(&self.template, &values)
    }
}
