//! Output artifact naming.

use std::path::{Component, Path, PathBuf};

use crate::config::GeneratorConfig;
use crate::error::{LoaderError, Result};

/// Derives the validator artifact name from a message-definition artifact.
///
/// Every occurrence of the source suffix is replaced by the target suffix.
/// When the source suffix does not occur, the target suffix is appended to
/// the name with its last extension removed.
///
/// # Examples
///
/// ```
/// use fieldcheck_loader::{GeneratorConfig, output_artifact_name};
///
/// let config = GeneratorConfig::default();
/// assert_eq!(output_artifact_name("shop/v1/order.pb.rs", &config), "shop/v1/order.pb.validation.rs");
/// assert_eq!(output_artifact_name("order.proto", &config), "order.pb.validation.rs");
/// assert_eq!(output_artifact_name("order", &config), "order.pb.validation.rs");
/// ```
pub fn output_artifact_name(artifact: &str, config: &GeneratorConfig) -> String {
    if !config.source_suffix.is_empty() && artifact.contains(&config.source_suffix) {
        return artifact.replace(&config.source_suffix, &config.target_suffix);
    }

    let stem = match Path::new(artifact).extension().and_then(|ext| ext.to_str()) {
        Some(ext) => &artifact[..artifact.len() - ext.len() - 1],
        None => artifact,
    };
    format!("{stem}{}", config.target_suffix)
}

/// Artifact name assumed for a schema file that does not declare one.
pub(crate) fn default_artifact(schema_path: &Path, config: &GeneratorConfig) -> String {
    let stem = schema_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("schema");
    format!("{stem}{}", config.source_suffix)
}

/// Turns an output artifact name into a path relative to the output
/// directory.
///
/// `.` segments are dropped so equal destinations compare equal. Absolute
/// names and `..` segments are rejected.
pub(crate) fn relative_output_path(name: &str) -> Result<PathBuf> {
    let mut path = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(segment) => path.push(segment),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(LoaderError::UnsafeArtifact(name.to_string()));
            }
        }
    }
    if path.as_os_str().is_empty() {
        return Err(LoaderError::UnsafeArtifact(name.to_string()));
    }
    Ok(path)
}
