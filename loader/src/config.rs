//! Generator configuration.
//!
//! # Example YAML
//!
//! ```yaml
//! source_suffix: .pb.rs
//! target_suffix: .pb.validation.rs
//! jobs: 4
//! strict: false
//! ```
//!
//! Every key is optional; missing keys take their default.

use std::io::{BufReader, BufWriter};
use std::path::Path;

use fieldcheck_core::CompileOptions;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Suffix of the message-definition artifacts validators accompany.
pub const DEFAULT_SOURCE_SUFFIX: &str = ".pb.rs";
/// Suffix of the generated validator artifacts.
pub const DEFAULT_TARGET_SUFFIX: &str = ".pb.validation.rs";

/// Settings for a generation run.
///
/// # Examples
///
/// ```
/// use fieldcheck_loader::GeneratorConfig;
///
/// let config: GeneratorConfig = serde_yaml::from_str("jobs: 2").unwrap();
/// assert_eq!(config.jobs, Some(2));
/// assert_eq!(config.target_suffix, ".pb.validation.rs");
/// assert!(!config.strict);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Suffix replaced in the artifact name (e.g. `.pb.rs`).
    pub source_suffix: String,
    /// Suffix substituted in its place (e.g. `.pb.validation.rs`).
    pub target_suffix: String,
    /// Worker threads for multi-file runs; `None` lets rayon decide.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
    /// Treat lint warnings as fatal.
    pub strict: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            source_suffix: DEFAULT_SOURCE_SUFFIX.to_string(),
            target_suffix: DEFAULT_TARGET_SUFFIX.to_string(),
            jobs: None,
            strict: false,
        }
    }
}

impl GeneratorConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::LoaderError::Io) if the file cannot be read, or
    /// [`Yaml`](crate::LoaderError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::LoaderError::Io) if the file cannot be written,
    /// or [`Yaml`](crate::LoaderError::Yaml) if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Compiler options implied by this configuration.
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            strict: self.strict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_complete() {
        let yaml = r#"
source_suffix: .proto.rs
target_suffix: .checks.rs
jobs: 8
strict: true
"#;
        let config: GeneratorConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.source_suffix, ".proto.rs");
        assert_eq!(config.target_suffix, ".checks.rs");
        assert_eq!(config.jobs, Some(8));
        assert!(config.strict);
        assert!(config.compile_options().strict);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: GeneratorConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.source_suffix, DEFAULT_SOURCE_SUFFIX);
        assert!(config.jobs.is_none());
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fieldcheck.yml");

        let original = GeneratorConfig {
            jobs: Some(3),
            strict: true,
            ..GeneratorConfig::default()
        };
        original.save(&path).unwrap();

        assert_eq!(GeneratorConfig::load(&path).unwrap(), original);
    }

    #[test]
    fn test_load_missing_file() {
        let err = GeneratorConfig::load("/nonexistent/fieldcheck.yml").unwrap_err();
        assert!(matches!(err, crate::LoaderError::Io(_)));
    }
}
