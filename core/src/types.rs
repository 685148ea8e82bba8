//! Schema type definitions for message validation.
//!
//! This module defines the in-memory schema a compilation pass consumes:
//! messages, their fields, and the validation annotations attached to each.
//! Rule metadata is a first-class field on [`FieldSchema`] rather than an
//! out-of-band lookup, and every type round-trips through JSON and YAML via
//! [`serde`].

use serde::{Deserialize, Serialize};

/// Default date layout used when a field asks for an ISO-8601 date check
/// without naming a format.
pub const DEFAULT_DATE_FORMAT: &str = "YYYY-MM-DD";

/// Primitive kind of a scalar field.
///
/// The integer family covers every signed, unsigned and fixed-width kind; the
/// float family covers single and double precision. `Bool`, `Bytes` and
/// `Enum` carry no rule family and pass through compilation untouched.
///
/// # Examples
///
/// ```
/// use fieldcheck_core::ScalarKind;
///
/// assert!(ScalarKind::Sfixed64.is_integer());
/// assert!(ScalarKind::Float.is_float());
/// assert!(!ScalarKind::Bytes.is_string());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
    Enum,
}

impl ScalarKind {
    /// Returns `true` for every integer kind, regardless of width or encoding.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Int32
                | Self::Int64
                | Self::Uint32
                | Self::Uint64
                | Self::Sint32
                | Self::Sint64
                | Self::Fixed32
                | Self::Fixed64
                | Self::Sfixed32
                | Self::Sfixed64
        )
    }

    /// Returns `true` for single and double precision floats.
    pub fn is_float(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    /// Returns `true` for the string kind.
    pub fn is_string(self) -> bool {
        matches!(self, Self::String)
    }
}

/// Declared type of a field.
///
/// # Examples
///
/// ```
/// use fieldcheck_core::{FieldType, ScalarKind};
///
/// let json = r#"{"message": ".google.protobuf.StringValue"}"#;
/// let ty: FieldType = serde_json::from_str(json).unwrap();
/// assert_eq!(ty, FieldType::Message(".google.protobuf.StringValue".into()));
///
/// let ty: FieldType = serde_json::from_str(r#"{"scalar": "int32"}"#).unwrap();
/// assert_eq!(ty, FieldType::Scalar(ScalarKind::Int32));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// A primitive value.
    Scalar(ScalarKind),
    /// An embedded message, referenced by (optionally fully qualified) name.
    /// Well-known wrapper types are spelled this way too.
    Message(String),
    /// A map field. Maps are never validated.
    Map {
        key: ScalarKind,
        value: Box<FieldType>,
    },
}

/// Sparse set of constraints attached to one field.
///
/// Every constraint is independently present or absent. String constraints,
/// integer bounds and float bounds live side by side; only the family that
/// matches the field's classification generates checks.
///
/// Builder methods mirror the field names:
///
/// ```
/// use fieldcheck_core::FieldValidationRule;
///
/// let rule = FieldValidationRule::default()
///     .not_empty()
///     .min_len(3)
///     .max_len(10)
///     .with_error("{field} is not a valid handle");
/// assert_eq!(rule.min_len, Some(3));
/// assert!(rule.has_string_rules());
/// assert!(!rule.has_integer_rules());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldValidationRule {
    /// `Some(true)`: the value must not be empty. `Some(false)`: empty is
    /// allowed and skips every other string check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_empty: Option<bool>,
    /// The value must equal this string exactly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<String>,
    /// The value must contain this substring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
    /// The whole value must match this regular expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_len: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_len: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eq_len: Option<u64>,
    #[serde(skip_serializing_if = "is_false")]
    pub is_uuid: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_email: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_iso8601_date: bool,
    /// Layout for the ISO-8601 check, e.g. `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub trim: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub lowercase: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub uppercase: bool,
    /// Name of a `fn(&str) -> String` applied before any other step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub int_eq: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub int_lte: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub int_gte: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub float_eq: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub float_lte: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub float_gte: Option<f64>,
    /// Custom message template; `{field}` and `{value}` are substituted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Skip this field entirely, overriding every other constraint.
    #[serde(skip_serializing_if = "is_false")]
    pub do_not_validate: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl FieldValidationRule {
    /// Requires a non-empty string.
    pub fn not_empty(mut self) -> Self {
        self.not_empty = Some(true);
        self
    }

    /// Explicitly allows an empty string; other string checks then only run
    /// on non-empty values.
    pub fn allow_empty(mut self) -> Self {
        self.not_empty = Some(false);
        self
    }

    pub fn matches(mut self, value: impl Into<String>) -> Self {
        self.matches = Some(value.into());
        self
    }

    pub fn contains(mut self, value: impl Into<String>) -> Self {
        self.contains = Some(value.into());
        self
    }

    pub fn regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(pattern.into());
        self
    }

    pub fn min_len(mut self, len: u64) -> Self {
        self.min_len = Some(len);
        self
    }

    pub fn max_len(mut self, len: u64) -> Self {
        self.max_len = Some(len);
        self
    }

    pub fn eq_len(mut self, len: u64) -> Self {
        self.eq_len = Some(len);
        self
    }

    pub fn uuid(mut self) -> Self {
        self.is_uuid = true;
        self
    }

    pub fn email(mut self) -> Self {
        self.is_email = true;
        self
    }

    /// Requires a date in `format` (see [`DEFAULT_DATE_FORMAT`]).
    pub fn iso8601_date(mut self, format: Option<&str>) -> Self {
        self.is_iso8601_date = true;
        self.date_format = format.map(String::from);
        self
    }

    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    pub fn lowercase(mut self) -> Self {
        self.lowercase = true;
        self
    }

    pub fn uppercase(mut self) -> Self {
        self.uppercase = true;
        self
    }

    pub fn transform(mut self, function: impl Into<String>) -> Self {
        self.transform = Some(function.into());
        self
    }

    pub fn int_eq(mut self, bound: i64) -> Self {
        self.int_eq = Some(bound);
        self
    }

    pub fn int_lte(mut self, bound: i64) -> Self {
        self.int_lte = Some(bound);
        self
    }

    pub fn int_gte(mut self, bound: i64) -> Self {
        self.int_gte = Some(bound);
        self
    }

    pub fn float_eq(mut self, bound: f64) -> Self {
        self.float_eq = Some(bound);
        self
    }

    pub fn float_lte(mut self, bound: f64) -> Self {
        self.float_lte = Some(bound);
        self
    }

    pub fn float_gte(mut self, bound: f64) -> Self {
        self.float_gte = Some(bound);
        self
    }

    /// Overrides the default wording of every failure on this field.
    pub fn with_error(mut self, template: impl Into<String>) -> Self {
        self.error = Some(template.into());
        self
    }

    /// Marks the field as exempt from validation.
    pub fn skip(mut self) -> Self {
        self.do_not_validate = true;
        self
    }

    /// Returns the configured date layout or [`DEFAULT_DATE_FORMAT`].
    pub fn date_format(&self) -> &str {
        self.date_format.as_deref().unwrap_or(DEFAULT_DATE_FORMAT)
    }

    /// Returns `true` if any string check or string mutation is configured.
    pub fn has_string_rules(&self) -> bool {
        self.not_empty.is_some()
            || self.matches.is_some()
            || self.contains.is_some()
            || self.regex.is_some()
            || self.min_len.is_some()
            || self.max_len.is_some()
            || self.eq_len.is_some()
            || self.is_uuid
            || self.is_email
            || self.is_iso8601_date
            || self.trim
            || self.lowercase
            || self.uppercase
            || self.transform.is_some()
    }

    /// Returns `true` if any integer bound is configured.
    pub fn has_integer_rules(&self) -> bool {
        self.int_eq.is_some() || self.int_lte.is_some() || self.int_gte.is_some()
    }

    /// Returns `true` if any float bound is configured.
    pub fn has_float_rules(&self) -> bool {
        self.float_eq.is_some() || self.float_lte.is_some() || self.float_gte.is_some()
    }
}

/// Schema for one field of a message.
///
/// # Examples
///
/// ```
/// use fieldcheck_core::{FieldSchema, FieldValidationRule, ScalarKind};
///
/// let tags = FieldSchema::string("tags")
///     .repeated()
///     .with_rule(FieldValidationRule::default().not_empty());
/// assert!(tags.repeated);
///
/// let age = FieldSchema::scalar("age", ScalarKind::Int32);
/// assert!(age.rule.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Field name as declared in the schema.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the field holds a sequence of values.
    #[serde(default, skip_serializing_if = "is_false")]
    pub repeated: bool,
    /// Attached constraints, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<FieldValidationRule>,
}

impl FieldSchema {
    /// Creates a field with no constraints.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            repeated: false,
            rule: None,
        }
    }

    /// Creates a scalar field.
    pub fn scalar(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self::new(name, FieldType::Scalar(kind))
    }

    /// Creates a string field.
    pub fn string(name: impl Into<String>) -> Self {
        Self::scalar(name, ScalarKind::String)
    }

    /// Creates an embedded message field.
    pub fn message(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Message(type_name.into()))
    }

    /// Creates a map field.
    pub fn map(name: impl Into<String>, key: ScalarKind, value: FieldType) -> Self {
        Self::new(
            name,
            FieldType::Map {
                key,
                value: Box::new(value),
            },
        )
    }

    /// Marks the field as repeated.
    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    /// Attaches a rule.
    pub fn with_rule(mut self, rule: FieldValidationRule) -> Self {
        self.rule = Some(rule);
        self
    }
}

/// Message-wide validation behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageValidationPolicy {
    /// Return as soon as one check fails instead of collecting every failure.
    pub stop_on_first_error: bool,
    /// Trim every string field before it is checked.
    pub trim_strings: bool,
}

/// Schema for one message type.
///
/// Field order is significant: it is the order checks are generated and, in
/// stop-on-first-error mode, the order failures take precedence.
///
/// # Examples
///
/// ```
/// use fieldcheck_core::*;
///
/// let person = MessageSchema::new("Person")
///     .with_field(FieldSchema::string("name"))
///     .with_field(FieldSchema::scalar("age", ScalarKind::Int32))
///     .with_policy(MessageValidationPolicy { stop_on_first_error: true, trim_strings: false });
///
/// assert_eq!(person.fields[1].name, "age");
/// assert!(person.find_field("name").is_some());
/// assert!(person.policy().stop_on_first_error);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSchema {
    /// Message name.
    pub name: String,
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
    /// Message-wide policy; absent means the default policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<MessageValidationPolicy>,
}

impl MessageSchema {
    /// Creates an empty message schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            policy: None,
        }
    }

    /// Appends a field.
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Sets the message policy.
    pub fn with_policy(mut self, policy: MessageValidationPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Returns the effective policy.
    pub fn policy(&self) -> MessageValidationPolicy {
        self.policy.unwrap_or_default()
    }

    /// Finds a field by name.
    pub fn find_field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_serializes_sparsely() {
        let rule = FieldValidationRule::default().min_len(3).uuid();
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json, serde_json::json!({"min_len": 3, "is_uuid": true}));
    }

    #[test]
    fn test_field_schema_parses_from_yaml() {
        let yaml = r#"
name: email
type:
  scalar: string
rule:
  trim: true
  is_email: true
  error: "{field} is not deliverable"
"#;
        let field: FieldSchema = serde_yaml::from_str(yaml).unwrap();
        let rule = field.rule.unwrap();
        assert!(rule.trim);
        assert!(rule.is_email);
        assert_eq!(rule.error.as_deref(), Some("{field} is not deliverable"));
        assert!(!field.repeated);
    }

    #[test]
    fn test_rule_families_are_independent() {
        let rule = FieldValidationRule::default().int_gte(0).float_lte(1.5);
        assert!(rule.has_integer_rules());
        assert!(rule.has_float_rules());
        assert!(!rule.has_string_rules());
    }

    #[test]
    fn test_default_date_format() {
        let rule = FieldValidationRule::default().iso8601_date(None);
        assert_eq!(rule.date_format(), DEFAULT_DATE_FORMAT);
        let rule = FieldValidationRule::default().iso8601_date(Some("YYYY-MM-DDThh:mm:ss"));
        assert_eq!(rule.date_format(), "YYYY-MM-DDThh:mm:ss");
    }

    #[test]
    fn test_policy_defaults_when_absent() {
        let message = MessageSchema::new("Empty");
        assert_eq!(message.policy(), MessageValidationPolicy::default());
    }
}
