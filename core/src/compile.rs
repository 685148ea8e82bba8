//! Message compilation.
//!
//! [`compile`] turns a [`SchemaSet`] into a [`CompiledUnit`]: one
//! [`CompiledMessage`] per message schema, each an ordered list of
//! [`FieldPlan`]s. The same plan drives the in-process executor and the
//! source generator.
//!
//! Messages are compiled independently on the rayon pool. Each task returns
//! the plan together with the [`Requirements`] it referenced; the
//! accumulators are merged once every task has finished, so compilation
//! holds no shared mutable state.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::classify::{Access, Classification, FieldKind, classify};
use crate::error::CompileError;
use crate::exec::Validator;
use crate::helpers::Helper;
use crate::lint::{SchemaError, lint_schema_set};
use crate::package::strip_package;
use crate::rules::{self, NumericRules, StringRules};
use crate::template::MessageTemplate;
use crate::value::Message;
use crate::{FieldSchema, MessageSchema, MessageValidationPolicy, SchemaSet, ValidationErrors};

const MSG_NESTED: &str = "{field} is invalid";

/// A transform function resolved by name at run time.
pub type Transform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// What a compiled unit references beyond its own plans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirements {
    /// Shared helper predicates.
    pub helpers: BTreeSet<Helper>,
    /// Regex sources, as written in the rules.
    pub patterns: BTreeSet<String>,
    /// Transform function names.
    pub transforms: BTreeSet<String>,
}

impl Requirements {
    /// Folds `other` into `self`.
    pub fn merge(&mut self, other: Requirements) {
        self.helpers.extend(other.helpers);
        self.patterns.extend(other.patterns);
        self.transforms.extend(other.transforms);
    }
}

/// Whether a field holds one value or a sequence of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Single,
    Repeated,
}

/// Why a field generates no checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The rule opts the field out.
    DoNotValidate,
    /// The field's type supports rules but none are configured.
    NoRules,
    /// Map fields are not validated.
    Map,
    /// No rule family applies to the field's type.
    Unsupported,
}

/// The work done for one field's values.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldProgram {
    String(StringRules),
    Integer(NumericRules<i64>),
    Float(NumericRules<f64>),
    /// Recurse into an embedded message and wrap its failures.
    Message {
        type_name: String,
        message: MessageTemplate,
    },
    Skip(SkipReason),
}

/// The compiled plan for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPlan {
    pub name: String,
    pub shape: Shape,
    pub access: Access,
    pub program: FieldProgram,
}

impl FieldPlan {
    fn skipped(field: &FieldSchema, reason: SkipReason) -> Self {
        Self {
            name: field.name.clone(),
            shape: if field.repeated { Shape::Repeated } else { Shape::Single },
            access: Access::Direct,
            program: FieldProgram::Skip(reason),
        }
    }

    /// Returns `true` if this field generates no work.
    pub fn is_skipped(&self) -> bool {
        matches!(self.program, FieldProgram::Skip(_))
    }
}

/// The compiled validator for one message.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledMessage {
    pub name: String,
    pub stop_on_first_error: bool,
    /// Plans in field declaration order.
    pub fields: Vec<FieldPlan>,
}

/// Compiler switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Reject lint warnings as well as fatal findings.
    pub strict: bool,
}

/// Every compiled validator of one schema set.
///
/// # Examples
///
/// ```
/// use fieldcheck_core::*;
///
/// let set = SchemaSet::new().with_message(
///     MessageSchema::new("Signup").with_field(
///         FieldSchema::string("handle")
///             .with_rule(FieldValidationRule::default().transform("slugify").min_len(3)),
///     ),
/// );
///
/// let mut unit = compile(&set).unwrap();
/// assert_eq!(unit.missing_transforms(), ["slugify"]);
///
/// unit.register_transform("slugify", |s| s.trim().to_lowercase().replace(' ', "-"));
/// assert!(unit.missing_transforms().is_empty());
///
/// let mut signup = Message::new().with("handle", "  Ada L ");
/// assert!(unit.validate("Signup", Some(&mut signup)).unwrap().is_none());
/// assert_eq!(signup.get("handle").and_then(Value::as_str), Some("ada-l"));
/// ```
#[derive(Clone)]
pub struct CompiledUnit {
    pub package: Option<String>,
    pub artifact: Option<String>,
    /// Messages in schema declaration order.
    pub messages: Vec<CompiledMessage>,
    pub requirements: Requirements,
    transforms: HashMap<String, Transform>,
}

impl fmt::Debug for CompiledUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut registered: Vec<&str> = self.transforms.keys().map(String::as_str).collect();
        registered.sort_unstable();
        f.debug_struct("CompiledUnit")
            .field("package", &self.package)
            .field("artifact", &self.artifact)
            .field("messages", &self.messages)
            .field("requirements", &self.requirements)
            .field("transforms", &registered)
            .finish()
    }
}

impl CompiledUnit {
    /// Finds a compiled message by plain or fully qualified name.
    pub fn message(&self, type_name: &str) -> Option<&CompiledMessage> {
        let local = strip_package(self.package.as_deref(), type_name);
        self.messages.iter().find(|message| message.name == local)
    }

    /// Returns a validator handle for one message.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UnknownMessage`] if the unit has no such
    /// message.
    pub fn validator(&self, type_name: &str) -> Result<Validator<'_>, CompileError> {
        self.message(type_name)
            .map(|message| Validator::new(self, message))
            .ok_or_else(|| CompileError::UnknownMessage(type_name.to_string()))
    }

    /// Validates one message instance. See [`Validator::validate`].
    pub fn validate(
        &self,
        type_name: &str,
        message: Option<&mut Message>,
    ) -> Result<Option<ValidationErrors>, CompileError> {
        Ok(self.validator(type_name)?.validate(message))
    }

    /// Registers the function a rule's `transform` name resolves to.
    pub fn register_transform<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.transforms.insert(name.into(), Arc::new(function));
    }

    /// Looks up a registered transform.
    pub fn transform(&self, name: &str) -> Option<&Transform> {
        self.transforms.get(name)
    }

    /// Transform names referenced by some rule but never registered.
    pub fn missing_transforms(&self) -> Vec<&str> {
        self.requirements
            .transforms
            .iter()
            .filter(|name| !self.transforms.contains_key(name.as_str()))
            .map(String::as_str)
            .collect()
    }
}

/// Compiles a schema set with default options.
///
/// # Errors
///
/// Returns [`CompileError::InvalidSchema`] when linting finds a fatal
/// problem, or [`CompileError::InvalidRegex`] for a pattern that does not
/// compile.
pub fn compile(set: &SchemaSet) -> Result<CompiledUnit, CompileError> {
    compile_with_options(set, CompileOptions::default())
}

/// Compiles a schema set.
///
/// Non-fatal lint findings are logged and compilation proceeds, unless
/// `options.strict` is set, in which case they fail it too.
pub fn compile_with_options(
    set: &SchemaSet,
    options: CompileOptions,
) -> Result<CompiledUnit, CompileError> {
    let (fatal, warnings): (Vec<SchemaError>, Vec<SchemaError>) = lint_schema_set(set)
        .into_iter()
        .partition(|finding| options.strict || finding.is_fatal());
    if !fatal.is_empty() {
        return Err(CompileError::InvalidSchema(fatal));
    }
    for finding in &warnings {
        warn!(%finding, "Schema lint warning");
    }

    let compiled = set
        .messages
        .par_iter()
        .map(compile_message)
        .collect::<Result<Vec<_>, _>>()?;

    let mut requirements = Requirements::default();
    let mut messages = Vec::with_capacity(compiled.len());
    for (message, reqs) in compiled {
        requirements.merge(reqs);
        messages.push(message);
    }

    info!(
        package = ?set.package,
        messages = messages.len(),
        patterns = requirements.patterns.len(),
        "Compiled schema set"
    );

    Ok(CompiledUnit {
        package: set.package.clone(),
        artifact: set.artifact.clone(),
        messages,
        requirements,
        transforms: HashMap::new(),
    })
}

/// Compiles one message schema, returning its plan and what it references.
pub fn compile_message(
    schema: &MessageSchema,
) -> Result<(CompiledMessage, Requirements), CompileError> {
    let policy = schema.policy();
    let mut reqs = Requirements::default();
    let fields = schema
        .fields
        .iter()
        .map(|field| compile_field(field, &policy, &mut reqs))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        message = %schema.name,
        active = fields.iter().filter(|plan| !plan.is_skipped()).count(),
        "Compiled message"
    );

    let message = CompiledMessage {
        name: schema.name.clone(),
        stop_on_first_error: policy.stop_on_first_error,
        fields,
    };
    Ok((message, reqs))
}

fn compile_field(
    field: &FieldSchema,
    policy: &MessageValidationPolicy,
    reqs: &mut Requirements,
) -> Result<FieldPlan, CompileError> {
    let rule = field.rule.as_ref();
    if rule.is_some_and(|rule| rule.do_not_validate) {
        return Ok(FieldPlan::skipped(field, SkipReason::DoNotValidate));
    }

    let (shape, kind, access) = match classify(field) {
        Classification::Single { kind, access } => (Shape::Single, kind, access),
        Classification::Repeated { kind, access } => (Shape::Repeated, kind, access),
        Classification::Map => return Ok(FieldPlan::skipped(field, SkipReason::Map)),
        Classification::PassThrough => {
            return Ok(FieldPlan::skipped(field, SkipReason::Unsupported));
        }
    };

    let program = match kind {
        FieldKind::String => {
            let rules = rules::string_rules(&field.name, rule, policy, reqs)?;
            if rules.is_empty() {
                FieldProgram::Skip(SkipReason::NoRules)
            } else {
                FieldProgram::String(rules)
            }
        }
        FieldKind::Integer => match rule.map(rules::integer_rules) {
            Some(rules) if !rules.is_empty() => FieldProgram::Integer(rules),
            _ => FieldProgram::Skip(SkipReason::NoRules),
        },
        FieldKind::Float => match rule.map(rules::float_rules) {
            Some(rules) if !rules.is_empty() => FieldProgram::Float(rules),
            _ => FieldProgram::Skip(SkipReason::NoRules),
        },
        FieldKind::Message(type_name) => FieldProgram::Message {
            type_name,
            message: MessageTemplate::new(rule.and_then(|r| r.error.as_deref()), MSG_NESTED, ""),
        },
    };

    Ok(FieldPlan {
        name: field.name.clone(),
        shape,
        access,
        program,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldValidationRule, ScalarKind};

    fn person() -> MessageSchema {
        MessageSchema::new("Person")
            .with_field(
                FieldSchema::string("name")
                    .with_rule(FieldValidationRule::default().min_len(3).max_len(10)),
            )
            .with_field(
                FieldSchema::scalar("age", ScalarKind::Int32)
                    .with_rule(FieldValidationRule::default().int_gte(0)),
            )
            .with_field(FieldSchema::scalar("active", ScalarKind::Bool))
            .with_field(FieldSchema::message("address", "Address"))
    }

    #[test]
    fn test_plans_follow_declaration_order() {
        let (message, _) = compile_message(&person()).unwrap();
        let names: Vec<&str> = message.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["name", "age", "active", "address"]);
        assert!(matches!(message.fields[0].program, FieldProgram::String(_)));
        assert!(matches!(message.fields[1].program, FieldProgram::Integer(_)));
        assert_eq!(message.fields[2].program, FieldProgram::Skip(SkipReason::Unsupported));
        assert!(matches!(
            &message.fields[3].program,
            FieldProgram::Message { type_name, .. } if type_name == "Address"
        ));
    }

    #[test]
    fn test_do_not_validate_wins_over_rules() {
        let schema = MessageSchema::new("M").with_field(
            FieldSchema::string("secret")
                .with_rule(FieldValidationRule::default().not_empty().skip()),
        );
        let (message, _) = compile_message(&schema).unwrap();
        assert_eq!(message.fields[0].program, FieldProgram::Skip(SkipReason::DoNotValidate));
    }

    #[test]
    fn test_unruled_scalars_are_skipped() {
        let schema = MessageSchema::new("M")
            .with_field(FieldSchema::string("note"))
            .with_field(FieldSchema::scalar("count", ScalarKind::Uint64))
            .with_field(FieldSchema::map(
                "labels",
                ScalarKind::String,
                crate::FieldType::Scalar(ScalarKind::String),
            ));
        let (message, _) = compile_message(&schema).unwrap();
        let reasons: Vec<_> = message.fields.iter().map(|f| f.program.clone()).collect();
        assert_eq!(
            reasons,
            [
                FieldProgram::Skip(SkipReason::NoRules),
                FieldProgram::Skip(SkipReason::NoRules),
                FieldProgram::Skip(SkipReason::Map),
            ]
        );
    }

    #[test]
    fn test_requirements_are_merged_across_messages() {
        let set = SchemaSet::new()
            .with_message(MessageSchema::new("A").with_field(
                FieldSchema::string("id").with_rule(FieldValidationRule::default().uuid()),
            ))
            .with_message(MessageSchema::new("B").with_field(
                FieldSchema::string("code")
                    .with_rule(FieldValidationRule::default().regex("[A-Z]{3}").transform("upper")),
            ));
        let unit = compile(&set).unwrap();
        assert_eq!(unit.requirements.helpers, BTreeSet::from([Helper::Uuid]));
        assert_eq!(unit.requirements.patterns, BTreeSet::from(["[A-Z]{3}".to_string()]));
        assert_eq!(unit.missing_transforms(), ["upper"]);
        let names: Vec<&str> = unit.messages.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn test_fatal_lint_blocks_compilation() {
        let set = SchemaSet::new()
            .with_message(MessageSchema::new("A"))
            .with_message(MessageSchema::new("A"));
        let err = compile(&set).unwrap_err();
        assert!(matches!(err, CompileError::InvalidSchema(ref findings) if findings.len() == 1));
    }

    #[test]
    fn test_strict_rejects_warnings() {
        let set = SchemaSet::new().with_message(MessageSchema::new("A").with_field(
            FieldSchema::scalar("n", ScalarKind::Int64)
                .with_rule(FieldValidationRule::default().min_len(1)),
        ));
        assert!(compile(&set).is_ok());
        let err = compile_with_options(&set, CompileOptions { strict: true }).unwrap_err();
        assert!(matches!(err, CompileError::InvalidSchema(_)));
    }

    #[test]
    fn test_message_lookup_accepts_qualified_names() {
        let set = SchemaSet::new().with_package("people.v1").with_message(person());
        let unit = compile(&set).unwrap();
        assert!(unit.message(".people.v1.Person").is_some());
        assert!(unit.message("Person").is_some());
        assert!(matches!(
            unit.validator("Robot"),
            Err(CompileError::UnknownMessage(name)) if name == "Robot"
        ));
    }

    #[test]
    fn test_nested_template_honours_custom_error() {
        let schema = MessageSchema::new("Order").with_field(
            FieldSchema::message("customer", "Customer")
                .with_rule(FieldValidationRule::default().with_error("check {field}")),
        );
        let (message, _) = compile_message(&schema).unwrap();
        let FieldProgram::Message { message: template, .. } = &message.fields[0].program else {
            panic!("expected an embedded message plan");
        };
        assert_eq!(template.render("customer"), "check customer");
    }
}
