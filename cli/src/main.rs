use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use fieldcheck_core::{Message, SchemaSet, ValidationErrors, compile, lint_schema_set};
use fieldcheck_loader::{
    GeneratorConfig, SchemaFormat, generate_all, load_schema_file, schema_paths_in_dir,
};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// CLI-specific report format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
    Text,
}

#[derive(Debug, Parser)]
#[command(name = "fieldcheck")]
#[command(about = "Generate and run declarative field validators", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate Rust validator sources from schema files.
    Generate(GenerateArgs),
    /// Validate a JSON or YAML instance against a message schema.
    Check(CheckArgs),
    /// Report schema problems without generating anything.
    Lint(LintArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Schema files and/or directories containing schema files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Output directory for generated sources.
    #[arg(long)]
    output: PathBuf,
    /// Generator configuration YAML.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of parallel generation jobs (default: number of CPUs).
    #[arg(long)]
    jobs: Option<usize>,
    /// Treat lint warnings as errors.
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Schema file declaring the message.
    #[arg(long)]
    schema: PathBuf,
    /// Message to validate, plain or fully qualified.
    #[arg(long)]
    message: String,
    /// Instance file (JSON or YAML); `-` reads JSON from stdin.
    #[arg(long)]
    input: PathBuf,
    /// Report format.
    #[arg(long, default_value = "text")]
    format: CliOutputFormat,
    /// Also print the instance after trimming and transforms.
    #[arg(long)]
    print_normalized: bool,
}

#[derive(Debug, Args)]
struct LintArgs {
    /// Schema files and/or directories containing schema files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Treat every finding as an error.
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    message: String,
    valid: bool,
    errors: Vec<ReportedError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    normalized: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct ReportedError {
    field: String,
    message: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Check(args) => run_check(args),
        Command::Lint(args) => run_lint(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), String> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => GeneratorConfig::default(),
    };
    if args.jobs.is_some() {
        config.jobs = args.jobs;
    }
    if args.strict {
        config.strict = true;
    }
    if config.jobs == Some(0) {
        return Err("--jobs must be at least 1".to_string());
    }

    let paths = collect_schema_paths(&args.inputs)?;
    if paths.is_empty() {
        return Err("No schema files found in the given inputs".to_string());
    }

    fs::create_dir_all(&args.output).map_err(|err| {
        format!(
            "Failed to create output directory '{}': {err}",
            args.output.display()
        )
    })?;

    info!(files = paths.len(), ?config, "Generating validators");
    let outcomes = generate_all(&paths, &args.output, &config).map_err(|e| e.to_string())?;

    let mut failed = 0usize;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(generated) => println!(
                "Generated '{}' ({} message(s)).",
                generated.output.display(),
                generated.messages
            ),
            Err(err) => {
                failed += 1;
                eprintln!("  {}: {err}", outcome.input.display());
            }
        }
    }

    if failed > 0 {
        return Err(format!(
            "Failed to generate {failed} of {} schema file(s)",
            outcomes.len()
        ));
    }
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let set = load_schema(&args.schema)?;
    let unit = compile(&set).map_err(|e| e.to_string())?;
    let validator = unit.validator(&args.message).map_err(|e| e.to_string())?;

    let instance = read_instance(&args.input)?;
    let mut message = Message::from_json(instance)
        .map_err(|_| format!("Instance '{}' is not a JSON object", args.input.display()))?;

    debug!(message = validator.name(), "Validating instance");
    let errors = validator.validate(message.as_mut());

    let report = CheckReport {
        message: validator.name().to_string(),
        valid: errors.is_none(),
        errors: errors.as_ref().map(reported_errors).unwrap_or_default(),
        normalized: if args.print_normalized {
            Some(message.as_ref().map_or(serde_json::Value::Null, Message::to_json))
        } else {
            None
        },
    };
    println!("{}", format_check_report(&report, args.format)?);

    if report.valid {
        Ok(())
    } else {
        Err(format!(
            "{} validation error(s) in {}",
            report.errors.len(),
            report.message
        ))
    }
}

fn run_lint(args: LintArgs) -> Result<(), String> {
    let paths = collect_schema_paths(&args.inputs)?;

    let mut errors = 0usize;
    let mut warnings = 0usize;
    for path in &paths {
        let set = load_schema(path)?;
        for finding in lint_schema_set(&set) {
            let severity = if args.strict || finding.is_fatal() {
                errors += 1;
                "error"
            } else {
                warnings += 1;
                "warning"
            };
            println!("{}: {severity}: {finding}", path.display());
        }
    }

    println!(
        "Linted {} schema file(s): {errors} error(s), {warnings} warning(s).",
        paths.len()
    );
    if errors > 0 {
        return Err(format!("{errors} schema error(s) found"));
    }
    Ok(())
}

fn load_schema(path: &Path) -> Result<SchemaSet, String> {
    load_schema_file(path).map_err(|err| format!("Failed to load '{}': {err}", path.display()))
}

/// Expands directories into the schema files directly inside them.
fn collect_schema_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, String> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let found = schema_paths_in_dir(input)
                .map_err(|err| format!("Failed to read '{}': {err}", input.display()))?;
            paths.extend(found);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

fn read_instance(path: &Path) -> Result<serde_json::Value, String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .map_err(|err| format!("Failed to read stdin: {err}"))?;
        return serde_json::from_str(&raw).map_err(|err| format!("Invalid JSON on stdin: {err}"));
    }

    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    match SchemaFormat::from_path(path) {
        Some(SchemaFormat::Yaml) => serde_yaml::from_str(&raw)
            .map_err(|err| format!("Invalid YAML in '{}': {err}", path.display())),
        _ => serde_json::from_str(&raw)
            .map_err(|err| format!("Invalid JSON in '{}': {err}", path.display())),
    }
}

fn reported_errors(errors: &ValidationErrors) -> Vec<ReportedError> {
    let (fields, messages) = errors.flatten();
    fields
        .into_iter()
        .zip(messages)
        .map(|(field, message)| ReportedError { field, message })
        .collect()
}

/// Formats a [`CheckReport`] in the requested output format.
fn format_check_report(report: &CheckReport, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        CliOutputFormat::Yaml => {
            serde_yaml::to_string(report).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        CliOutputFormat::Text => {
            let mut out = if report.valid {
                format!("{} is valid.", report.message)
            } else {
                format!("{} is invalid:", report.message)
            };
            for error in &report.errors {
                out.push_str(&format!("\n  {}: {}", error.field, error.message));
            }
            if let Some(normalized) = &report.normalized {
                let pretty = serde_json::to_string_pretty(normalized)
                    .map_err(|e| format!("JSON serialization failed: {e}"))?;
                out.push('\n');
                out.push_str(&pretty);
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldcheck_core::ValidationError;

    #[test]
    fn test_reported_errors_are_flattened() {
        let errors = ValidationErrors::from(vec![ValidationError::nested(
            "address",
            "address is invalid",
            ValidationErrors::from(vec![ValidationError::violation(
                "street",
                "street can not be an empty string",
            )]),
        )]);

        let reported = reported_errors(&errors);
        assert_eq!(reported.len(), 2);
        assert_eq!(reported[1].field, "address.street");
    }

    #[test]
    fn test_text_report() {
        let report = CheckReport {
            message: "Person".into(),
            valid: false,
            errors: vec![ReportedError {
                field: "name".into(),
                message: "name can not be an empty string".into(),
            }],
            normalized: None,
        };
        let text = format_check_report(&report, CliOutputFormat::Text).unwrap();
        assert_eq!(text, "Person is invalid:\n  name: name can not be an empty string");
    }

    #[test]
    fn test_json_report_omits_missing_normalized() {
        let report = CheckReport {
            message: "Person".into(),
            valid: true,
            errors: Vec::new(),
            normalized: None,
        };
        let json = format_check_report(&report, CliOutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["valid"], true);
        assert!(value.get("normalized").is_none());
    }
}
