//! Rust source generation for compiled field validators.
//!
//! Takes a [`CompiledUnit`](fieldcheck_core::CompiledUnit) and renders the
//! validators as a standalone Rust file for prost-generated message types.
//! Names follow prost's conventions ([`naming`]); the file is assembled as a
//! token stream and pretty-printed, so it always parses.
//!
//! # Example
//!
//! ```
//! use fieldcheck_core::*;
//!
//! let set = SchemaSet::new()
//!     .with_artifact("people.pb.rs")
//!     .with_message(
//!         MessageSchema::new("Person").with_field(
//!             FieldSchema::string("email").with_rule(FieldValidationRule::default().trim().email()),
//!         ),
//!     );
//!
//! let source = fieldcheck_codegen::generate_rust(&compile(&set).unwrap()).unwrap();
//! assert!(source.contains("// Source: people.pb.rs"));
//! assert!(source.contains("is_valid_email(value.as_str())"));
//! ```

mod error;
pub mod naming;
mod rust;
mod support;

pub use error::{CodegenError, Result};
pub use rust::{generate_rust, unit_digest};
