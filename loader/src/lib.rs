//! Schema loading and validator generation for fieldcheck.
//!
//! This crate sits around [`fieldcheck_core`] and [`fieldcheck_codegen`]:
//! it reads schema sets from JSON or YAML files, loads the generator
//! configuration, names output artifacts, and writes generated validator
//! sources, one file per schema set.
//!
//! # Quick start
//!
//! ```no_run
//! use fieldcheck_loader::{GeneratorConfig, generate_file};
//!
//! let config = GeneratorConfig::load("fieldcheck.yml").unwrap_or_default();
//! let generated = generate_file("schemas/order.yaml", "src/generated", &config).unwrap();
//! println!("wrote {}", generated.output.display());
//! ```

mod config;
mod error;
mod loader;
mod naming;
mod pipeline;

pub use config::{DEFAULT_SOURCE_SUFFIX, DEFAULT_TARGET_SUFFIX, GeneratorConfig};
pub use error::{LoaderError, Result};
pub use loader::{
    CatalogSource, LoadedSchema, SchemaCatalog, SchemaFormat, SchemaLoader, load_schema_dir,
    load_schema_file, schema_paths_in_dir,
};
pub use naming::output_artifact_name;
pub use pipeline::{GeneratedFile, GenerationOutcome, generate_all, generate_file};
