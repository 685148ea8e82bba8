//! Schema file to validator source generation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use fieldcheck_codegen::{generate_rust, unit_digest};
use fieldcheck_core::{SchemaSet, compile_with_options};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::GeneratorConfig;
use crate::error::{LoaderError, Result};
use crate::loader::load_schema_file;
use crate::naming::{default_artifact, output_artifact_name, relative_output_path};

/// One written validator file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Schema file the validators were generated from.
    pub input: PathBuf,
    /// Path of the written source file.
    pub output: PathBuf,
    /// Digest recorded in the generated header.
    pub digest: String,
    /// Number of messages in the schema set.
    pub messages: usize,
}

/// Result of generating from one input in a multi-file run.
#[derive(Debug)]
pub struct GenerationOutcome {
    pub input: PathBuf,
    pub result: Result<GeneratedFile>,
}

/// A loaded schema set and where its validators will be written.
struct PlannedFile {
    input: PathBuf,
    set: SchemaSet,
    output: PathBuf,
}

fn plan_file(input: &Path, out_dir: &Path, config: &GeneratorConfig) -> Result<PlannedFile> {
    let mut set = load_schema_file(input)?;
    let artifact = match &set.artifact {
        Some(artifact) => artifact.clone(),
        None => {
            let artifact = default_artifact(input, config);
            set.artifact = Some(artifact.clone());
            artifact
        }
    };
    let output = out_dir.join(relative_output_path(&output_artifact_name(&artifact, config))?);
    Ok(PlannedFile {
        input: input.to_path_buf(),
        set,
        output,
    })
}

fn write_planned(planned: PlannedFile, config: &GeneratorConfig) -> Result<GeneratedFile> {
    let PlannedFile { input, set, output } = planned;

    let unit = compile_with_options(&set, config.compile_options())?;
    let missing = unit.missing_transforms();
    if !missing.is_empty() {
        // Generated code calls transforms by path; they must exist in the
        // consuming crate.
        info!(transforms = ?missing, "Generated validators reference external transforms");
    }
    let source = generate_rust(&unit)?;

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output, source)?;

    info!(input = %input.display(), output = %output.display(), messages = unit.messages.len(), "Wrote validators");
    Ok(GeneratedFile {
        input,
        output,
        digest: unit_digest(&unit),
        messages: unit.messages.len(),
    })
}

/// Loads, compiles and renders one schema file into `out_dir`.
///
/// The output name comes from the set's `artifact` through
/// [`output_artifact_name`]; a set without one is named after the schema
/// file. Intermediate directories are created as needed.
///
/// # Errors
///
/// Returns [`UnsafeArtifact`](crate::LoaderError::UnsafeArtifact) when the
/// artifact is absolute or climbs out of `out_dir` with `..`.
pub fn generate_file(
    input: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    config: &GeneratorConfig,
) -> Result<GeneratedFile> {
    let planned = plan_file(input.as_ref(), out_dir.as_ref(), config)?;
    write_planned(planned, config)
}

/// Generates every input in parallel, reporting outcomes in input order.
///
/// Output paths are resolved for every input before anything is written.
/// Inputs that resolve to the same output all fail with
/// [`DuplicateOutput`](crate::LoaderError::DuplicateOutput) and write
/// nothing. Any other failing input does not stop the rest. The pool has
/// `config.jobs` threads, or rayon's default when unset.
///
/// # Errors
///
/// Returns [`ThreadPool`](crate::LoaderError::ThreadPool) if the worker pool
/// cannot be created; per-file failures are reported in the outcomes.
pub fn generate_all(
    inputs: &[PathBuf],
    out_dir: impl AsRef<Path>,
    config: &GeneratorConfig,
) -> Result<Vec<GenerationOutcome>> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = config.jobs {
        builder = builder.num_threads(jobs);
    }
    let pool = builder.build()?;
    let out_dir = out_dir.as_ref();

    let planned: Vec<Result<PlannedFile>> = pool.install(|| {
        inputs
            .par_iter()
            .map(|input| plan_file(input, out_dir, config))
            .collect()
    });

    let mut claims: HashMap<PathBuf, usize> = HashMap::new();
    for planned in planned.iter().flatten() {
        *claims.entry(planned.output.clone()).or_default() += 1;
    }

    let outcomes: Vec<GenerationOutcome> = pool.install(|| {
        planned
            .into_par_iter()
            .zip(inputs.par_iter())
            .map(|(planned, input)| GenerationOutcome {
                input: input.clone(),
                result: planned.and_then(|planned| {
                    if claims.get(&planned.output).copied().unwrap_or_default() > 1 {
                        Err(LoaderError::DuplicateOutput(planned.output))
                    } else {
                        write_planned(planned, config)
                    }
                }),
            })
            .collect()
    });

    for outcome in &outcomes {
        if let Err(err) = &outcome.result {
            warn!(input = %outcome.input.display(), error = %err, "Generation failed");
        }
    }
    Ok(outcomes)
}
