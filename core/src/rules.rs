//! Rule generators.
//!
//! Each generator turns a [`FieldValidationRule`] into the ordered steps one
//! value goes through. String steps run in a fixed order:
//!
//! 1. transform function
//! 2. trim (field rule or message default)
//! 3. lowercase
//! 4. uppercase
//! 5. emptiness
//! 6. exact match
//! 7. substring
//! 8. regex (full match)
//! 9. min length
//! 10. max length
//! 11. exact length
//! 12. UUID
//! 13. email
//! 14. date format
//!
//! Mutations always precede checks so checks observe the normalized value,
//! and the emptiness decision gates every later check.

use regex::Regex;

use crate::compile::Requirements;
use crate::error::CompileError;
use crate::helpers::Helper;
use crate::template::MessageTemplate;
use crate::{FieldValidationRule, MessageValidationPolicy};

const MSG_NOT_EMPTY: &str = "{field} can not be an empty string";
const MSG_EQUALS: &str = "{field} must equal {value}";
const MSG_CONTAINS: &str = "{field} must contain {value}";
const MSG_REGEX: &str = "{field} must match regex {value}";
const MSG_MIN_LEN: &str = "{field} must be at least {value} characters long";
const MSG_MAX_LEN: &str = "{field} must be no more than {value} characters long";
const MSG_EQ_LEN: &str = "{field} must be exactly {value} characters long";
const MSG_UUID: &str = "{field} must be a valid UUID";
const MSG_EMAIL: &str = "{field} must be a valid email address";
const MSG_DATE: &str = "{field} must be a date in format {value}";
const MSG_LTE: &str = "{field} must be less than or equal to {value}";
const MSG_GTE: &str = "{field} must be greater than or equal to {value}";

/// A step that rewrites a string value before it is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Apply a named `fn(&str) -> String`.
    Transform(String),
    Trim,
    Lowercase,
    Uppercase,
}

impl Mutation {
    /// Applies a built-in mutation. Returns `false` for [`Mutation::Transform`],
    /// which needs a resolved function.
    pub fn apply_builtin(&self, value: &mut String) -> bool {
        match self {
            Mutation::Trim => {
                let trimmed = value.trim();
                if trimmed.len() != value.len() {
                    *value = trimmed.to_string();
                }
            }
            Mutation::Lowercase => *value = value.to_lowercase(),
            Mutation::Uppercase => *value = value.to_uppercase(),
            Mutation::Transform(_) => return false,
        }
        true
    }
}

/// A compiled regular expression, anchored for a full match.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles `source` so that it must match the whole value.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&anchored(source))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as written in the rule.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Wraps a pattern so it only matches the entire input.
pub fn anchored(source: &str) -> String {
    format!("^(?:{source})$")
}

/// One string predicate. A value passes when the predicate holds.
#[derive(Debug, Clone, PartialEq)]
pub enum StringCondition {
    Equals(String),
    Contains(String),
    Regex(Pattern),
    MinLen(u64),
    MaxLen(u64),
    EqLen(u64),
    Uuid,
    Email,
    /// Date in a `YYYY-MM-DD`-style layout.
    Date(String),
}

impl StringCondition {
    /// Helper predicate this condition relies on, if any.
    pub fn helper(&self) -> Option<Helper> {
        match self {
            StringCondition::Uuid => Some(Helper::Uuid),
            StringCondition::Email => Some(Helper::Email),
            StringCondition::Date(_) => Some(Helper::Date),
            _ => None,
        }
    }

    /// Evaluates the condition. Lengths count Unicode scalar values.
    pub fn holds(&self, value: &str) -> bool {
        match self {
            StringCondition::Equals(expected) => value == expected,
            StringCondition::Contains(needle) => value.contains(needle.as_str()),
            StringCondition::Regex(pattern) => pattern.is_match(value),
            StringCondition::MinLen(min) => char_len(value) >= *min,
            StringCondition::MaxLen(max) => char_len(value) <= *max,
            StringCondition::EqLen(len) => char_len(value) == *len,
            StringCondition::Uuid => crate::helpers::is_valid_uuid(value),
            StringCondition::Email => crate::helpers::is_valid_email(value),
            StringCondition::Date(layout) => crate::helpers::is_valid_date(value, layout),
        }
    }
}

fn char_len(value: &str) -> u64 {
    value.chars().count() as u64
}

/// A condition paired with the message reported when it fails.
#[derive(Debug, Clone, PartialEq)]
pub struct Check<C> {
    pub condition: C,
    pub message: MessageTemplate,
}

/// How an empty string is treated.
#[derive(Debug, Clone, PartialEq)]
pub enum Emptiness {
    /// No emptiness rule; every check runs on every value.
    Unconstrained,
    /// Empty fails with this message; other checks run only when non-empty.
    Forbidden(MessageTemplate),
    /// Empty passes; other checks run only when non-empty.
    Allowed,
}

/// Ordered steps for one string value.
#[derive(Debug, Clone, PartialEq)]
pub struct StringRules {
    pub mutations: Vec<Mutation>,
    pub emptiness: Emptiness,
    pub checks: Vec<Check<StringCondition>>,
}

impl StringRules {
    /// Returns `true` if the rules neither mutate nor check anything.
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
            && self.emptiness == Emptiness::Unconstrained
            && self.checks.is_empty()
    }
}

/// One numeric bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound<T> {
    Eq(T),
    Lte(T),
    Gte(T),
}

impl<T: Copy> Bound<T> {
    /// The bound's value.
    pub fn value(&self) -> T {
        match self {
            Bound::Eq(v) | Bound::Lte(v) | Bound::Gte(v) => *v,
        }
    }
}

impl Bound<i64> {
    /// Evaluates the bound against any integer widened to `i128`.
    pub fn admits(&self, value: i128) -> bool {
        let bound = i128::from(self.value());
        match self {
            Bound::Eq(_) => value == bound,
            Bound::Lte(_) => value <= bound,
            Bound::Gte(_) => value >= bound,
        }
    }
}

impl Bound<f64> {
    pub fn admits(&self, value: f64) -> bool {
        let bound = self.value();
        match self {
            Bound::Eq(_) => value == bound,
            Bound::Lte(_) => value <= bound,
            Bound::Gte(_) => value >= bound,
        }
    }
}

/// Ordered bound checks for one numeric value.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericRules<T> {
    pub checks: Vec<Check<Bound<T>>>,
}

impl<T> NumericRules<T> {
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

/// Generates the steps for a string field.
///
/// `rule` may be absent when only the message-level trim default applies.
/// Helpers, patterns and transforms referenced are recorded in `reqs`.
///
/// # Errors
///
/// Returns [`CompileError::InvalidRegex`] if the regex rule does not compile.
pub fn string_rules(
    field: &str,
    rule: Option<&FieldValidationRule>,
    policy: &MessageValidationPolicy,
    reqs: &mut Requirements,
) -> Result<StringRules, CompileError> {
    let mut mutations = Vec::new();
    let default_rule = FieldValidationRule::default();
    let rule = rule.unwrap_or(&default_rule);
    let custom = rule.error.as_deref();

    if let Some(function) = &rule.transform {
        reqs.transforms.insert(function.clone());
        mutations.push(Mutation::Transform(function.clone()));
    }
    if rule.trim || policy.trim_strings {
        mutations.push(Mutation::Trim);
    }
    if rule.lowercase {
        mutations.push(Mutation::Lowercase);
    }
    if rule.uppercase {
        mutations.push(Mutation::Uppercase);
    }

    let emptiness = match rule.not_empty {
        Some(true) => Emptiness::Forbidden(MessageTemplate::new(custom, MSG_NOT_EMPTY, "")),
        Some(false) => Emptiness::Allowed,
        None => Emptiness::Unconstrained,
    };

    let mut checks = Vec::new();
    let mut push = |condition: StringCondition, default: &str, value: String| {
        if let Some(helper) = condition.helper() {
            reqs.helpers.insert(helper);
        }
        if let StringCondition::Regex(pattern) = &condition {
            reqs.patterns.insert(pattern.source().to_string());
        }
        checks.push(Check {
            condition,
            message: MessageTemplate::new(custom, default, value),
        });
    };

    if let Some(expected) = &rule.matches {
        push(StringCondition::Equals(expected.clone()), MSG_EQUALS, expected.clone());
    }
    if let Some(needle) = &rule.contains {
        push(StringCondition::Contains(needle.clone()), MSG_CONTAINS, needle.clone());
    }
    if let Some(source) = &rule.regex {
        let pattern = Pattern::new(source).map_err(|source| CompileError::InvalidRegex {
            field: field.to_string(),
            source,
        })?;
        push(StringCondition::Regex(pattern), MSG_REGEX, source.clone());
    }
    if let Some(min) = rule.min_len {
        push(StringCondition::MinLen(min), MSG_MIN_LEN, min.to_string());
    }
    if let Some(max) = rule.max_len {
        push(StringCondition::MaxLen(max), MSG_MAX_LEN, max.to_string());
    }
    if let Some(len) = rule.eq_len {
        push(StringCondition::EqLen(len), MSG_EQ_LEN, len.to_string());
    }
    if rule.is_uuid {
        push(StringCondition::Uuid, MSG_UUID, String::new());
    }
    if rule.is_email {
        push(StringCondition::Email, MSG_EMAIL, String::new());
    }
    if rule.is_iso8601_date {
        let layout = rule.date_format().to_string();
        push(StringCondition::Date(layout.clone()), MSG_DATE, layout);
    }

    Ok(StringRules {
        mutations,
        emptiness,
        checks,
    })
}

/// Generates the bound checks for an integer field.
pub fn integer_rules(rule: &FieldValidationRule) -> NumericRules<i64> {
    numeric_rules(
        rule,
        [
            rule.int_eq.map(Bound::Eq),
            rule.int_lte.map(Bound::Lte),
            rule.int_gte.map(Bound::Gte),
        ],
    )
}

/// Generates the bound checks for a float field.
pub fn float_rules(rule: &FieldValidationRule) -> NumericRules<f64> {
    numeric_rules(
        rule,
        [
            rule.float_eq.map(Bound::Eq),
            rule.float_lte.map(Bound::Lte),
            rule.float_gte.map(Bound::Gte),
        ],
    )
}

fn numeric_rules<T>(rule: &FieldValidationRule, bounds: [Option<Bound<T>>; 3]) -> NumericRules<T>
where
    T: Copy + std::fmt::Display,
{
    let custom = rule.error.as_deref();
    let checks = bounds
        .into_iter()
        .flatten()
        .map(|bound| {
            let default = match bound {
                Bound::Eq(_) => MSG_EQUALS,
                Bound::Lte(_) => MSG_LTE,
                Bound::Gte(_) => MSG_GTE,
            };
            Check {
                message: MessageTemplate::new(custom, default, bound.value().to_string()),
                condition: bound,
            }
        })
        .collect();
    NumericRules { checks }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(rule: &FieldValidationRule) -> (StringRules, Requirements) {
        let mut reqs = Requirements::default();
        let rules = string_rules(
            "name",
            Some(rule),
            &MessageValidationPolicy::default(),
            &mut reqs,
        )
        .unwrap();
        (rules, reqs)
    }

    #[test]
    fn test_mutations_precede_checks_in_fixed_order() {
        let rule = FieldValidationRule::default()
            .uppercase()
            .lowercase()
            .trim()
            .transform("normalize");
        let (rules, _) = compile(&rule);
        assert_eq!(
            rules.mutations,
            vec![
                Mutation::Transform("normalize".into()),
                Mutation::Trim,
                Mutation::Lowercase,
                Mutation::Uppercase,
            ]
        );
    }

    #[test]
    fn test_check_order_is_fixed() {
        let rule = FieldValidationRule::default()
            .iso8601_date(None)
            .email()
            .uuid()
            .eq_len(4)
            .max_len(9)
            .min_len(1)
            .regex("[a-z]+")
            .contains("a")
            .matches("abcd");
        let (rules, reqs) = compile(&rule);
        let order: Vec<&str> = rules
            .checks
            .iter()
            .map(|check| match &check.condition {
                StringCondition::Equals(_) => "equals",
                StringCondition::Contains(_) => "contains",
                StringCondition::Regex(_) => "regex",
                StringCondition::MinLen(_) => "min",
                StringCondition::MaxLen(_) => "max",
                StringCondition::EqLen(_) => "eq",
                StringCondition::Uuid => "uuid",
                StringCondition::Email => "email",
                StringCondition::Date(_) => "date",
            })
            .collect();
        assert_eq!(
            order,
            ["equals", "contains", "regex", "min", "max", "eq", "uuid", "email", "date"]
        );
        assert_eq!(reqs.helpers.len(), 3);
        assert!(reqs.patterns.contains("[a-z]+"));
    }

    #[test]
    fn test_message_trim_default_applies_without_rule() {
        let mut reqs = Requirements::default();
        let policy = MessageValidationPolicy {
            stop_on_first_error: false,
            trim_strings: true,
        };
        let rules = string_rules("note", None, &policy, &mut reqs).unwrap();
        assert_eq!(rules.mutations, vec![Mutation::Trim]);
        assert!(rules.checks.is_empty());
    }

    #[test]
    fn test_trim_is_not_duplicated() {
        let mut reqs = Requirements::default();
        let policy = MessageValidationPolicy {
            stop_on_first_error: false,
            trim_strings: true,
        };
        let rule = FieldValidationRule::default().trim();
        let rules = string_rules("note", Some(&rule), &policy, &mut reqs).unwrap();
        assert_eq!(rules.mutations, vec![Mutation::Trim]);
    }

    #[test]
    fn test_emptiness_modes() {
        let (rules, _) = compile(&FieldValidationRule::default().not_empty());
        assert!(matches!(rules.emptiness, Emptiness::Forbidden(_)));
        let (rules, _) = compile(&FieldValidationRule::default().allow_empty());
        assert_eq!(rules.emptiness, Emptiness::Allowed);
        let (rules, _) = compile(&FieldValidationRule::default().min_len(1));
        assert_eq!(rules.emptiness, Emptiness::Unconstrained);
    }

    #[test]
    fn test_invalid_regex_is_a_compile_error() {
        let mut reqs = Requirements::default();
        let rule = FieldValidationRule::default().regex("(unclosed");
        let err = string_rules("code", Some(&rule), &MessageValidationPolicy::default(), &mut reqs)
            .unwrap_err();
        assert!(matches!(err, CompileError::InvalidRegex { ref field, .. } if field == "code"));
    }

    #[test]
    fn test_regex_is_full_match() {
        let pattern = Pattern::new("[a-z]+").unwrap();
        assert!(pattern.is_match("abc"));
        assert!(!pattern.is_match("abc1"));
        let alternation = Pattern::new("cat|dog").unwrap();
        assert!(!alternation.is_match("cats"));
        assert!(alternation.is_match("dog"));
    }

    #[test]
    fn test_length_counts_characters() {
        assert!(StringCondition::EqLen(3).holds("äöü"));
        assert!(!StringCondition::MaxLen(2).holds("äöü"));
    }

    #[test]
    fn test_integer_messages_use_natural_formatting() {
        let rules = integer_rules(&FieldValidationRule::default().int_gte(0).int_lte(120));
        let messages: Vec<String> = rules.checks.iter().map(|c| c.message.render("age")).collect();
        assert_eq!(
            messages,
            [
                "age must be less than or equal to 120",
                "age must be greater than or equal to 0",
            ]
        );
    }

    #[test]
    fn test_float_bounds() {
        let rules = float_rules(&FieldValidationRule::default().float_eq(2.5).float_gte(3.0));
        assert_eq!(rules.checks[0].message.render("ratio"), "ratio must equal 2.5");
        assert_eq!(
            rules.checks[1].message.render("ratio"),
            "ratio must be greater than or equal to 3"
        );
        assert!(rules.checks[0].condition.admits(2.5));
        assert!(!rules.checks[1].condition.admits(2.99));
    }

    #[test]
    fn test_integer_bound_handles_unsigned_values() {
        let bound = Bound::Lte(10_i64);
        assert!(!bound.admits(i128::from(u64::MAX)));
        assert!(Bound::Gte(-5_i64).admits(-5));
    }

    #[test]
    fn test_custom_error_template_overrides_every_check() {
        let rule = FieldValidationRule::default()
            .min_len(3)
            .with_error("{field} needs {value}+ chars");
        let (rules, _) = compile(&rule);
        assert_eq!(rules.checks[0].message.render("name"), "name needs 3+ chars");
    }
}
