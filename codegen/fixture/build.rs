//! Build script for fieldcheck-codegen-fixture.
//!
//! Compiles the people schema and writes its validators to
//! `$OUT_DIR/people.pb.validation.rs`, which `src/lib.rs` includes next to
//! the message structs.

use std::env;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use fieldcheck_codegen::generate_rust;
use fieldcheck_core::{
    FieldSchema, FieldValidationRule, MessageSchema, MessageValidationPolicy, ScalarKind,
    SchemaSet, compile,
};

fn people() -> SchemaSet {
    SchemaSet::new()
        .with_package("people.v1")
        .with_artifact("people.pb.rs")
        .with_message(
            MessageSchema::new("Person")
                .with_field(
                    FieldSchema::string("name")
                        .with_rule(FieldValidationRule::default().not_empty().min_len(2)),
                )
                .with_field(
                    FieldSchema::scalar("age", ScalarKind::Int32)
                        .with_rule(FieldValidationRule::default().int_gte(0).int_lte(120)),
                )
                .with_field(
                    FieldSchema::string("id").with_rule(FieldValidationRule::default().uuid()),
                )
                .with_field(
                    FieldSchema::string("tags")
                        .repeated()
                        .with_rule(FieldValidationRule::default().max_len(4)),
                )
                .with_field(
                    FieldSchema::scalar("scores", ScalarKind::Uint64)
                        .repeated()
                        .with_rule(FieldValidationRule::default().int_lte(100)),
                )
                .with_field(
                    FieldSchema::scalar("ratio", ScalarKind::Float)
                        .with_rule(FieldValidationRule::default().float_lte(2.0)),
                )
                .with_field(
                    FieldSchema::message("nick", ".google.protobuf.StringValue")
                        .with_rule(FieldValidationRule::default().trim().min_len(2)),
                )
                .with_field(
                    FieldSchema::message("limit", ".google.protobuf.Int64Value")
                        .with_rule(FieldValidationRule::default().int_gte(1)),
                )
                .with_field(FieldSchema::message("address", "Address"))
                .with_field(FieldSchema::message("items", "Address").repeated()),
        )
        .with_message(
            MessageSchema::new("Address")
                .with_field(
                    FieldSchema::string("street")
                        .with_rule(FieldValidationRule::default().not_empty()),
                )
                .with_field(
                    FieldSchema::string("zip")
                        .with_rule(FieldValidationRule::default().regex("[0-9]{5}")),
                ),
        )
        .with_message(
            MessageSchema::new("Order")
                .with_policy(MessageValidationPolicy {
                    stop_on_first_error: true,
                    trim_strings: false,
                })
                .with_field(
                    FieldSchema::string("tags")
                        .repeated()
                        .with_rule(FieldValidationRule::default().max_len(3)),
                )
                .with_field(
                    FieldSchema::string("code")
                        .with_rule(FieldValidationRule::default().not_empty()),
                ),
        )
        .with_message(
            MessageSchema::new("Node")
                .with_field(
                    FieldSchema::string("label")
                        .with_rule(FieldValidationRule::default().not_empty()),
                )
                .with_field(FieldSchema::message("child", "Node")),
        )
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=build.rs");

    let unit = compile(&people())?;
    let source = generate_rust(&unit)?;
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    fs::write(out_dir.join("people.pb.validation.rs"), source)?;
    Ok(())
}
