//! Declarative field validation for protobuf-style messages.
//!
//! This crate compiles validation rules attached to a message schema into
//! one validator per message type:
//!
//! - [`SchemaSet`], [`MessageSchema`], [`FieldSchema`] and
//!   [`FieldValidationRule`] describe what to check.
//! - [`classify`] puts every field into exactly one rule family, resolving
//!   well-known wrappers ([`wkt`]) to their boxed scalar.
//! - [`compile`] lints the set ([`lint_schema_set`]) and turns each message
//!   into an ordered plan of mutations and checks ([`rules`]).
//! - [`CompiledUnit::validate`] runs a plan against a dynamic [`Message`];
//!   failures come back as a [`ValidationErrors`] tree that [`flatten`]
//!   turns into parallel path and message lists.
//!
//! Messages either aggregate every failure or stop at the first one,
//! depending on their [`MessageValidationPolicy`].
//!
//! # Example
//!
//! ```
//! use fieldcheck_core::*;
//!
//! let set = SchemaSet::new().with_message(
//!     MessageSchema::new("Person")
//!         .with_field(
//!             FieldSchema::string("Name")
//!                 .with_rule(FieldValidationRule::default().min_len(3).max_len(10)),
//!         )
//!         .with_field(
//!             FieldSchema::scalar("Age", ScalarKind::Int32)
//!                 .with_rule(FieldValidationRule::default().int_gte(0)),
//!         ),
//! );
//! let unit = compile(&set).unwrap();
//!
//! let mut person = Message::new().with("Name", "Al").with("Age", -1);
//! let errors = unit.validate("Person", Some(&mut person)).unwrap().unwrap();
//!
//! let (fields, messages) = flatten(&errors);
//! assert_eq!(fields, ["Name", "Age"]);
//! assert_eq!(messages[1], "Age must be greater than or equal to 0");
//! ```

mod classify;
mod compile;
mod error;
mod exec;
pub mod helpers;
mod lint;
mod package;
pub mod rules;
pub mod template;
mod types;
mod value;
pub mod wkt;

pub use classify::{Access, Classification, FieldKind, classify};
pub use compile::{
    CompileOptions, CompiledMessage, CompiledUnit, FieldPlan, FieldProgram, Requirements, Shape,
    SkipReason, Transform, compile, compile_message, compile_with_options,
};
pub use error::{
    CompileError, ErrorKind, NIL_MESSAGE, NIL_MESSAGE_FIELD, ValidationError, ValidationErrors,
    flatten,
};
pub use exec::Validator;
pub use helpers::Helper;
pub use lint::{RuleFamily, SchemaError, lint_message, lint_schema_set};
pub use package::SchemaSet;
pub use types::*;
pub use value::{Message, Value};
