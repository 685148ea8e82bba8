use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("fieldcheck_cli_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn path(&self) -> &PathBuf {
        &self.path
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.join(name);
        fs::write(&path, contents).expect("failed to write file");
        path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

const PERSON_YAML: &str = r#"
package: people.v1
artifact: people.pb.rs
messages:
  - name: Person
    policy: { trim_strings: true }
    fields:
      - name: Name
        type: { scalar: string }
        rule: { min_len: 3, max_len: 10 }
      - name: Age
        type: { scalar: int32 }
        rule: { int_gte: 0 }
"#;

fn fieldcheck(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fieldcheck"))
        .args(args)
        .output()
        .expect("failed to run fieldcheck")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_valid_instance_exits_zero() {
    let dir = TempDir::new("check_valid");
    let schema = dir.write("person.yaml", PERSON_YAML);
    let input = dir.write("ada.json", r#"{"Name": "Ada", "Age": 36}"#);

    let output = fieldcheck(&[
        "check",
        "--schema",
        schema.to_str().unwrap(),
        "--message",
        "Person",
        "--input",
        input.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Person is valid."));
}

#[test]
fn check_invalid_instance_reports_flattened_errors() {
    let dir = TempDir::new("check_invalid");
    let schema = dir.write("person.yaml", PERSON_YAML);
    let input = dir.write("al.json", r#"{"Name": "Al", "Age": -1}"#);

    let output = fieldcheck(&[
        "check",
        "--schema",
        schema.to_str().unwrap(),
        "--message",
        ".people.v1.Person",
        "--input",
        input.to_str().unwrap(),
        "--format",
        "json",
    ]);

    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["valid"], false);
    assert_eq!(report["errors"][0]["field"], "Name");
    assert_eq!(report["errors"][0]["message"], "Name must be at least 3 characters long");
    assert_eq!(report["errors"][1]["message"], "Age must be greater than or equal to 0");
    assert!(stderr(&output).contains("error: 2 validation error(s) in Person"));
}

#[test]
fn check_prints_normalized_instance() {
    let dir = TempDir::new("check_normalized");
    let schema = dir.write("person.yaml", PERSON_YAML);
    let input = dir.write("ada.json", r#"{"Name": "  Ada  ", "Age": 36}"#);

    let output = fieldcheck(&[
        "check",
        "--schema",
        schema.to_str().unwrap(),
        "--message",
        "Person",
        "--input",
        input.to_str().unwrap(),
        "--format",
        "json",
        "--print-normalized",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["normalized"]["Name"], "Ada");
}

#[test]
fn check_null_instance_reports_nil_message() {
    let dir = TempDir::new("check_nil");
    let schema = dir.write("person.yaml", PERSON_YAML);
    let input = dir.write("null.json", "null");

    let output = fieldcheck(&[
        "check",
        "--schema",
        schema.to_str().unwrap(),
        "--message",
        "Person",
        "--input",
        input.to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("message: message is nil, validation can not proceed"));
}

#[test]
fn check_unknown_message_fails() {
    let dir = TempDir::new("check_unknown");
    let schema = dir.write("person.yaml", PERSON_YAML);
    let input = dir.write("empty.json", "{}");

    let output = fieldcheck(&[
        "check",
        "--schema",
        schema.to_str().unwrap(),
        "--message",
        "Robot",
        "--input",
        input.to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Robot"));
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

#[test]
fn generate_writes_validation_artifact() {
    let dir = TempDir::new("generate");
    let out = TempDir::new("generate_out");
    dir.write("person.yaml", PERSON_YAML);

    let output = fieldcheck(&[
        "generate",
        dir.path().to_str().unwrap(),
        "--output",
        out.path().to_str().unwrap(),
        "--jobs",
        "2",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let generated = fs::read_to_string(out.join("people.pb.validation.rs")).unwrap();
    assert!(generated.starts_with("// @generated"));
    assert!(generated.contains("pub fn validate_person"));
}

#[test]
fn generate_uses_config_suffixes() {
    let dir = TempDir::new("generate_config");
    let out = TempDir::new("generate_config_out");
    let schema = dir.write("person.yaml", PERSON_YAML);
    let config = dir.write(
        "fieldcheck.yml",
        "source_suffix: .pb.rs\ntarget_suffix: .checks.rs\n",
    );

    let output = fieldcheck(&[
        "generate",
        schema.to_str().unwrap(),
        "--output",
        out.path().to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(out.join("people.checks.rs").exists());
}

#[test]
fn generate_reports_failing_files() {
    let dir = TempDir::new("generate_fail");
    let out = TempDir::new("generate_fail_out");
    let schema = dir.write("broken.json", "{ nope");

    let output = fieldcheck(&[
        "generate",
        schema.to_str().unwrap(),
        "--output",
        out.path().to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to generate 1 of 1 schema file(s)"));
}

// ---------------------------------------------------------------------------
// lint
// ---------------------------------------------------------------------------

#[test]
fn lint_warning_passes_unless_strict() {
    let dir = TempDir::new("lint_warning");
    let schema = dir.write(
        "age.yaml",
        r#"
messages:
  - name: Person
    fields:
      - name: age
        type: { scalar: int32 }
        rule: { min_len: 3 }
"#,
    );

    let output = fieldcheck(&["lint", schema.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("warning:"));

    let output = fieldcheck(&["lint", "--strict", schema.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn lint_duplicate_field_fails() {
    let dir = TempDir::new("lint_duplicate");
    let schema = dir.write(
        "dup.yaml",
        r#"
messages:
  - name: Person
    fields:
      - name: name
        type: { scalar: string }
      - name: name
        type: { scalar: string }
"#,
    );

    let output = fieldcheck(&["lint", schema.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("error: duplicate field in message Person: name"));
}

#[test]
fn lint_directory_skips_non_schema_files() {
    let dir = TempDir::new("lint_directory");
    dir.write("person.yaml", PERSON_YAML);
    dir.write("README.txt", "not a schema");

    let output = fieldcheck(&["lint", dir.path().to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Linted 1 schema file(s): 0 error(s), 0 warning(s)."));
}
