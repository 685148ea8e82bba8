//! In-process execution of compiled validators.
//!
//! A [`Validator`] walks one [`CompiledMessage`] over a dynamic [`Message`],
//! mutating string values in place and collecting failures. The message's
//! stop-on-first-error policy is applied by the error sink, so it holds
//! uniformly for top-level fields, repeated elements and embedded messages.

use std::ops::ControlFlow;

use tracing::{debug, warn};

use crate::classify::Access;
use crate::compile::{CompiledMessage, CompiledUnit, FieldPlan, FieldProgram, Shape};
use crate::rules::{Bound, Emptiness, Mutation, NumericRules, StringRules};
use crate::template::MessageTemplate;
use crate::value::{Message, Value};
use crate::{ValidationError, ValidationErrors};

/// A compiled validator bound to its unit.
///
/// # Examples
///
/// ```
/// use fieldcheck_core::*;
///
/// let set = SchemaSet::new().with_message(
///     MessageSchema::new("Post").with_field(
///         FieldSchema::string("tags")
///             .repeated()
///             .with_rule(FieldValidationRule::default().not_empty()),
///     ),
/// );
/// let unit = compile(&set).unwrap();
/// let validator = unit.validator("Post").unwrap();
///
/// let mut post = Message::new().with("tags", vec!["a", "", "c"]);
/// let errors = validator.validate(Some(&mut post)).unwrap();
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors.first().unwrap().field, "tags[1]");
///
/// assert_eq!(validator.validate(None).unwrap().first().unwrap().kind, ErrorKind::NilMessage);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    unit: &'a CompiledUnit,
    message: &'a CompiledMessage,
}

impl<'a> Validator<'a> {
    pub(crate) fn new(unit: &'a CompiledUnit, message: &'a CompiledMessage) -> Self {
        Self { unit, message }
    }

    /// Name of the message this validator checks.
    pub fn name(&self) -> &str {
        &self.message.name
    }

    /// Validates a possibly-absent message instance.
    ///
    /// Returns `None` when the message is valid. An absent message yields a
    /// single [`ValidationError::nil_message`] and runs no field checks.
    pub fn validate(&self, message: Option<&mut Message>) -> Option<ValidationErrors> {
        let Some(message) = message else {
            return Some(ValidationErrors::from(vec![ValidationError::nil_message()]));
        };
        let errors = run_message(self.unit, self.message, message);
        (!errors.is_empty()).then_some(errors)
    }
}

struct Sink {
    errors: ValidationErrors,
    stop_on_first_error: bool,
}

impl Sink {
    fn new(stop_on_first_error: bool) -> Self {
        Self {
            errors: ValidationErrors::new(),
            stop_on_first_error,
        }
    }

    fn push(&mut self, error: ValidationError) -> ControlFlow<()> {
        self.errors.push(error);
        if self.stop_on_first_error {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    fn violation(&mut self, path: &str, message: &MessageTemplate) -> ControlFlow<()> {
        self.push(ValidationError::violation(path, message.render(path)))
    }

    fn unexpected_type(&mut self, path: &str) -> ControlFlow<()> {
        self.push(ValidationError::violation(
            path,
            format!("{path} has an unexpected value type"),
        ))
    }
}

fn run_message(unit: &CompiledUnit, plan: &CompiledMessage, message: &mut Message) -> ValidationErrors {
    let mut sink = Sink::new(plan.stop_on_first_error);
    for field in &plan.fields {
        if run_field(unit, field, message, &mut sink).is_break() {
            break;
        }
    }
    sink.errors
}

fn run_field(
    unit: &CompiledUnit,
    field: &FieldPlan,
    message: &mut Message,
    sink: &mut Sink,
) -> ControlFlow<()> {
    if field.is_skipped() {
        return ControlFlow::Continue(());
    }

    match field.shape {
        Shape::Single => run_slot(unit, field, &field.name, message.get_mut(&field.name), sink),
        Shape::Repeated => match message.get_mut(&field.name) {
            None | Some(Value::Null) => ControlFlow::Continue(()),
            Some(Value::List(items)) => {
                for (index, item) in items.iter_mut().enumerate() {
                    let path = format!("{}[{index}]", field.name);
                    run_slot(unit, field, &path, Some(item), sink)?;
                }
                ControlFlow::Continue(())
            }
            Some(_) => sink.unexpected_type(&field.name),
        },
    }
}

/// Where a field's checked value lives.
enum Slot<'v> {
    /// Nothing to check.
    Absent,
    /// Unset proto3 scalar; checked as its zero value, never written back.
    Zero,
    Present(&'v mut Value),
}

fn resolve<'v>(value: Option<&'v mut Value>, field: &FieldPlan) -> Slot<'v> {
    let embedded = matches!(field.program, FieldProgram::Message { .. });
    match (field.access, value) {
        (Access::Direct, None | Some(Value::Null)) if embedded => Slot::Absent,
        (Access::Direct, None | Some(Value::Null)) => Slot::Zero,
        (Access::Direct, Some(value)) => Slot::Present(value),
        (Access::Wrapper, None | Some(Value::Null)) => Slot::Absent,
        // A wrapper may also arrive in object form: {"value": ...}.
        (Access::Wrapper, Some(Value::Message(wrapper))) => match wrapper.get_mut("value") {
            Some(Value::Null) | None => Slot::Zero,
            Some(inner) => Slot::Present(inner),
        },
        (Access::Wrapper, Some(value)) => Slot::Present(value),
    }
}

fn zero_value(program: &FieldProgram) -> Value {
    match program {
        FieldProgram::String(_) => Value::String(String::new()),
        FieldProgram::Integer(_) => Value::Int(0),
        FieldProgram::Float(_) => Value::Float(0.0),
        FieldProgram::Message { .. } | FieldProgram::Skip(_) => Value::Null,
    }
}

fn run_slot(
    unit: &CompiledUnit,
    field: &FieldPlan,
    path: &str,
    value: Option<&mut Value>,
    sink: &mut Sink,
) -> ControlFlow<()> {
    match resolve(value, field) {
        Slot::Absent => ControlFlow::Continue(()),
        Slot::Zero => {
            let mut zero = zero_value(&field.program);
            run_value(unit, &field.program, path, &mut zero, sink)
        }
        Slot::Present(value) => run_value(unit, &field.program, path, value, sink),
    }
}

fn run_value(
    unit: &CompiledUnit,
    program: &FieldProgram,
    path: &str,
    value: &mut Value,
    sink: &mut Sink,
) -> ControlFlow<()> {
    match program {
        FieldProgram::String(rules) => match value {
            Value::String(text) => run_string(unit, rules, path, text, sink),
            _ => sink.unexpected_type(path),
        },
        FieldProgram::Integer(rules) => match value.as_i128() {
            Some(number) => run_numeric(rules, path, sink, |bound| bound.admits(number)),
            None => sink.unexpected_type(path),
        },
        FieldProgram::Float(rules) => match value.as_f64() {
            Some(number) => run_numeric(rules, path, sink, |bound| bound.admits(number)),
            None => sink.unexpected_type(path),
        },
        FieldProgram::Message { type_name, message } => match value {
            Value::Message(embedded) => run_embedded(unit, type_name, message, path, embedded, sink),
            Value::Null => ControlFlow::Continue(()),
            _ => sink.unexpected_type(path),
        },
        FieldProgram::Skip(_) => ControlFlow::Continue(()),
    }
}

fn run_string(
    unit: &CompiledUnit,
    rules: &StringRules,
    path: &str,
    value: &mut String,
    sink: &mut Sink,
) -> ControlFlow<()> {
    for mutation in &rules.mutations {
        match mutation {
            Mutation::Transform(name) => match unit.transform(name) {
                Some(function) => {
                    let transformed = function(value.as_str());
                    *value = transformed;
                }
                None => warn!(transform = %name, field = %path, "Transform function not registered"),
            },
            builtin => {
                builtin.apply_builtin(value);
            }
        }
    }

    match &rules.emptiness {
        Emptiness::Forbidden(message) if value.is_empty() => return sink.violation(path, message),
        Emptiness::Forbidden(_) | Emptiness::Allowed if value.is_empty() => {
            return ControlFlow::Continue(());
        }
        _ => {}
    }

    for check in &rules.checks {
        if !check.condition.holds(value) {
            sink.violation(path, &check.message)?;
        }
    }
    ControlFlow::Continue(())
}

fn run_numeric<T>(
    rules: &NumericRules<T>,
    path: &str,
    sink: &mut Sink,
    admits: impl Fn(&Bound<T>) -> bool,
) -> ControlFlow<()> {
    for check in &rules.checks {
        if !admits(&check.condition) {
            sink.violation(path, &check.message)?;
        }
    }
    ControlFlow::Continue(())
}

fn run_embedded(
    unit: &CompiledUnit,
    type_name: &str,
    template: &MessageTemplate,
    path: &str,
    embedded: &mut Message,
    sink: &mut Sink,
) -> ControlFlow<()> {
    let Some(plan) = unit.message(type_name) else {
        debug!(message = %type_name, field = %path, "No validator for embedded message, skipping");
        return ControlFlow::Continue(());
    };
    let errors = run_message(unit, plan, embedded);
    if errors.is_empty() {
        return ControlFlow::Continue(());
    }
    sink.push(ValidationError::nested(path, template.render(path), errors))
}
