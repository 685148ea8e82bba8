//! Schema loading from files and directories, with fallback chains.
//!
//! A schema file holds one [`SchemaSet`] in JSON or YAML; the format is
//! chosen by extension. Directories load every schema file they contain,
//! sorted by path so repeated runs see the same order.
//!
//! ```no_run
//! use fieldcheck_loader::SchemaCatalog;
//!
//! let catalog = SchemaCatalog::builder()
//!     .from_dir("schemas/")
//!     .from_file("schemas.yaml")
//!     .build()
//!     .unwrap();
//! println!("Loaded {} schema files", catalog.len());
//! ```

use std::io::BufReader;
use std::path::{Path, PathBuf};

use fieldcheck_core::{MessageSchema, SchemaSet};
use tracing::debug;

use crate::error::{LoaderError, Result};

/// Serialization format of a schema file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Json,
    Yaml,
}

impl SchemaFormat {
    /// Picks the format from a path's extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use fieldcheck_loader::SchemaFormat;
    ///
    /// assert_eq!(SchemaFormat::from_path("shop.json"), Some(SchemaFormat::Json));
    /// assert_eq!(SchemaFormat::from_path("shop.YML"), Some(SchemaFormat::Yaml));
    /// assert_eq!(SchemaFormat::from_path("shop.proto"), None);
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Loads one schema set from a `.json`, `.yaml` or `.yml` file.
///
/// # Errors
///
/// Returns [`LoaderError::UnsupportedFormat`] for other extensions,
/// [`LoaderError::Io`] if the file cannot be opened, and
/// [`LoaderError::Json`] or [`LoaderError::Yaml`] if it does not parse.
pub fn load_schema_file(path: impl AsRef<Path>) -> Result<SchemaSet> {
    let path = path.as_ref();
    let format =
        SchemaFormat::from_path(path).ok_or_else(|| LoaderError::UnsupportedFormat(path.to_path_buf()))?;

    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let set = match format {
        SchemaFormat::Json => serde_json::from_reader(reader)?,
        SchemaFormat::Yaml => serde_yaml::from_reader(reader)?,
    };
    debug!(path = %path.display(), ?format, "Loaded schema file");
    Ok(set)
}

/// A schema set together with the file it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSchema {
    pub path: PathBuf,
    pub set: SchemaSet,
}

/// Lists the schema files directly inside `dir`, sorted by path.
///
/// Files with other extensions are ignored; subdirectories are not walked.
pub fn schema_paths_in_dir(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && SchemaFormat::from_path(&path).is_some() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Loads every schema file listed by [`schema_paths_in_dir`].
///
/// # Errors
///
/// Returns the first error encountered reading the directory or parsing a
/// schema file.
pub fn load_schema_dir(dir: impl AsRef<Path>) -> Result<Vec<LoadedSchema>> {
    schema_paths_in_dir(dir)?
        .into_iter()
        .map(|path| {
            let set = load_schema_file(&path)?;
            Ok(LoadedSchema { path, set })
        })
        .collect()
}

/// Describes where a [`SchemaCatalog`] was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// A single schema file.
    File(PathBuf),
    /// A directory of schema files.
    Directory(PathBuf),
    /// A fallback chain; the catalog came from its first loadable entry.
    Multiple(Vec<CatalogSource>),
}

/// Schema sets loaded from one source.
#[derive(Debug)]
pub struct SchemaCatalog {
    schemas: Vec<LoadedSchema>,
    source: CatalogSource,
}

impl SchemaCatalog {
    /// Returns a new [`SchemaLoader`] for configuring a fallback chain.
    pub fn builder() -> SchemaLoader {
        SchemaLoader::new()
    }

    /// Loads a catalog holding a single schema file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let set = load_schema_file(path)?;
        Ok(Self {
            schemas: vec![LoadedSchema {
                path: path.to_path_buf(),
                set,
            }],
            source: CatalogSource::File(path.to_path_buf()),
        })
    }

    /// Loads a catalog from every schema file in a directory.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Ok(Self {
            schemas: load_schema_dir(path)?,
            source: CatalogSource::Directory(path.to_path_buf()),
        })
    }

    /// Returns the number of schema files in the catalog.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns `true` if the catalog holds no schema files.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoadedSchema> {
        self.schemas.iter()
    }

    /// Finds a message by name across every loaded set.
    ///
    /// Returns the set the message belongs to alongside it; the first set
    /// in path order wins.
    pub fn find_message(&self, type_name: &str) -> Option<(&LoadedSchema, &MessageSchema)> {
        self.schemas.iter().find_map(|loaded| {
            loaded
                .set
                .find_message(type_name)
                .map(|message| (loaded, message))
        })
    }

    /// Returns a reference to the source metadata.
    pub fn source(&self) -> &CatalogSource {
        &self.source
    }
}

/// Builder for a [`SchemaCatalog`] with a fallback chain.
///
/// Sources are tried in the order they are added. The first successful load
/// wins; if all fail, [`LoaderError::NoSourcesAvailable`] is returned.
#[derive(Debug, Default)]
pub struct SchemaLoader {
    sources: Vec<CatalogSource>,
}

impl SchemaLoader {
    /// Creates a new builder with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single schema file as a source.
    pub fn from_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(CatalogSource::File(path.into()));
        self
    }

    /// Adds a directory of schema files as a source.
    pub fn from_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(CatalogSource::Directory(path.into()));
        self
    }

    /// Attempts to load from the configured sources in order.
    pub fn build(self) -> Result<SchemaCatalog> {
        for source in &self.sources {
            let result = match source {
                CatalogSource::File(path) => SchemaCatalog::from_file(path),
                CatalogSource::Directory(path) => SchemaCatalog::from_dir(path),
                CatalogSource::Multiple(_) => continue,
            };

            match result {
                Ok(mut catalog) => {
                    catalog.source = CatalogSource::Multiple(self.sources.clone());
                    return Ok(catalog);
                }
                Err(err) => debug!(?source, error = %err, "Schema source unavailable"),
            }
        }

        Err(LoaderError::NoSourcesAvailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldcheck_core::{FieldSchema, FieldValidationRule};

    fn sample_set(message: &str) -> SchemaSet {
        SchemaSet::new().with_package("shop.v1").with_message(
            MessageSchema::new(message).with_field(
                FieldSchema::string("name").with_rule(FieldValidationRule::default().not_empty()),
            ),
        )
    }

    fn write_json(dir: &Path, file: &str, set: &SchemaSet) -> PathBuf {
        let path = dir.join(file);
        std::fs::write(&path, serde_json::to_string_pretty(set).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_load_json_and_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let set = sample_set("Order");

        let json = write_json(dir.path(), "order.json", &set);
        let yaml = dir.path().join("order.yaml");
        std::fs::write(&yaml, serde_yaml::to_string(&set).unwrap()).unwrap();

        assert_eq!(load_schema_file(&json).unwrap(), set);
        assert_eq!(load_schema_file(&yaml).unwrap(), set);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_schema_file("order.proto").unwrap_err();
        assert!(matches!(err, LoaderError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_schema_file(&path), Err(LoaderError::Json(_))));
    }

    #[test]
    fn test_dir_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        write_json(dir.path(), "b.json", &sample_set("B"));
        write_json(dir.path(), "a.json", &sample_set("A"));
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let loaded = load_schema_dir(dir.path()).unwrap();
        let names: Vec<_> = loaded
            .iter()
            .map(|l| l.set.messages[0].name.as_str())
            .collect();
        assert_eq!(names, ["A", "B"]);

        let paths = schema_paths_in_dir(dir.path()).unwrap();
        assert_eq!(paths, [dir.path().join("a.json"), dir.path().join("b.json")]);
    }

    #[test]
    fn test_catalog_find_message() {
        let dir = tempfile::tempdir().unwrap();
        write_json(dir.path(), "order.json", &sample_set("Order"));
        write_json(dir.path(), "user.json", &sample_set("User"));

        let catalog = SchemaCatalog::from_dir(dir.path()).unwrap();
        assert_eq!(catalog.len(), 2);

        let (loaded, message) = catalog.find_message(".shop.v1.User").unwrap();
        assert_eq!(message.name, "User");
        assert!(loaded.path.ends_with("user.json"));
        assert!(catalog.find_message("Missing").is_none());
    }

    #[test]
    fn test_builder_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(dir.path(), "order.json", &sample_set("Order"));

        let catalog = SchemaLoader::new()
            .from_dir("/nonexistent/schemas")
            .from_file(&path)
            .build()
            .unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(matches!(catalog.source(), CatalogSource::Multiple(sources) if sources.len() == 2));
    }

    #[test]
    fn test_builder_all_fail() {
        let err = SchemaLoader::new()
            .from_file("/nonexistent/a.json")
            .build()
            .unwrap_err();
        assert!(matches!(err, LoaderError::NoSourcesAvailable));

        let err = SchemaLoader::new().build().unwrap_err();
        assert!(matches!(err, LoaderError::NoSourcesAvailable));
    }
}
