//! Error types for loading schemas and writing generated files.

use std::path::PathBuf;

use fieldcheck_codegen::CodegenError;
use fieldcheck_core::CompileError;
use thiserror::Error;

/// Errors that can occur while loading schemas or generating validators.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The file extension is not one of `.json`, `.yaml`, `.yml`.
    #[error("unsupported schema format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// The schema set failed to compile.
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    /// The artifact name would place the output outside the output directory.
    #[error("artifact {0:?} must be a relative path without `..` segments")]
    UnsafeArtifact(String),

    /// Several inputs in one run resolve to the same output file.
    #[error("output {} is claimed by more than one schema file", .0.display())]
    DuplicateOutput(PathBuf),

    /// The compiled unit could not be rendered.
    #[error("codegen error: {0}")]
    Codegen(#[from] CodegenError),

    /// The worker pool could not be created.
    #[error("failed to create thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// All configured loader sources failed.
    #[error("no schema sources available")]
    NoSourcesAvailable,
}

/// Convenience alias for results with [`LoaderError`].
pub type Result<T> = std::result::Result<T, LoaderError>;
