use std::path::{Path, PathBuf};

use fieldcheck_core::{Message, compile};
use fieldcheck_loader::{
    GeneratorConfig, LoaderError, SchemaCatalog, generate_all, load_schema_dir,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const USER_YAML: &str = r#"
package: accounts.v1
artifact: accounts/v1/user.pb.rs
messages:
  - name: User
    policy: { trim_strings: true }
    fields:
      - name: email
        type: { scalar: string }
        rule: { is_email: true }
      - name: nickname
        type: { message: .google.protobuf.StringValue }
        rule: { min_len: 2, max_len: 12 }
      - name: address
        type: { message: Address }
  - name: Address
    fields:
      - name: street
        type: { scalar: string }
        rule: { not_empty: true }
"#;

const ORDER_JSON: &str = r#"{
  "package": "shop.v1",
  "messages": [
    {
      "name": "Order",
      "policy": { "stop_on_first_error": true },
      "fields": [
        { "name": "tags", "type": { "scalar": "string" }, "repeated": true, "rule": { "max_len": 4 } },
        { "name": "total", "type": { "scalar": "double" }, "rule": { "float_gte": 0.0 } }
      ]
    }
  ]
}"#;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[test]
fn test_directory_of_mixed_formats_compiles() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "user.yaml", USER_YAML);
    write(dir.path(), "order.json", ORDER_JSON);

    let loaded = load_schema_dir(dir.path()).unwrap();
    assert_eq!(loaded.len(), 2);
    assert!(loaded[0].path.ends_with("order.json"));

    for schema in &loaded {
        compile(&schema.set).unwrap();
    }
}

#[test]
fn test_loaded_schema_validates_instances() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "user.yaml", USER_YAML);

    let catalog = SchemaCatalog::from_dir(dir.path()).unwrap();
    let (loaded, _) = catalog.find_message("accounts.v1.User").unwrap();
    let unit = compile(&loaded.set).unwrap();

    let json = serde_json::json!({
        "email": "  ada@example.com ",
        "nickname": "a",
        "address": { "street": "" }
    });
    let mut user = Message::from_json(json).unwrap().unwrap();
    let errors = unit.validate("User", Some(&mut user)).unwrap().unwrap();

    let (fields, messages) = errors.flatten();
    assert_eq!(fields, ["nickname", "address", "address.street"]);
    assert_eq!(messages[0], "nickname must be at least 2 characters long");
    assert_eq!(user.get("email").and_then(|v| v.as_str()), Some("ada@example.com"));
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[test]
fn test_generate_all_writes_one_file_per_schema() {
    let dir = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let inputs = vec![
        write(dir.path(), "user.yaml", USER_YAML),
        write(dir.path(), "order.json", ORDER_JSON),
    ];

    let outcomes = generate_all(&inputs, out.path(), &GeneratorConfig::default()).unwrap();
    let outputs: Vec<_> = outcomes
        .into_iter()
        .map(|outcome| outcome.result.unwrap().output)
        .collect();

    assert_eq!(
        outputs,
        [
            out.path().join("accounts/v1/user.pb.validation.rs"),
            out.path().join("order.pb.validation.rs"),
        ]
    );
    for output in &outputs {
        assert!(output.exists());
    }
}

#[test]
fn test_generation_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "order.json", ORDER_JSON);
    let config = GeneratorConfig::default();

    let first = fieldcheck_loader::generate_file(&input, dir.path().join("a"), &config).unwrap();
    let second = fieldcheck_loader::generate_file(&input, dir.path().join("b"), &config).unwrap();

    assert_eq!(first.digest, second.digest);
    assert_eq!(
        std::fs::read_to_string(first.output).unwrap(),
        std::fs::read_to_string(second.output).unwrap()
    );
}

#[test]
fn test_invalid_schema_is_reported_per_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        dir.path(),
        "bad.yaml",
        r#"
messages:
  - name: Bad
    fields:
      - name: code
        type: { scalar: string }
        rule: { regex: "(" }
"#,
    );

    let outcomes = generate_all(&[input], dir.path(), &GeneratorConfig::default()).unwrap();
    assert!(matches!(outcomes[0].result, Err(LoaderError::Compile(_))));
}
