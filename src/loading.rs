//! Loading criteria from JSON text and the filesystem.
//!
//! Directory loading goes through the [`FileSystem`] trait so it can be
//! exercised against an in-memory tree. Each `*.json` file in a directory is
//! registered under its file stem; errors are collected across files rather
//! than stopping at the first bad one.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::criteria::Criteria;
use crate::error::ConfigErrors;
use crate::options::ValidatorOptions;
use crate::registry::{CriteriaRegistry, RegistryError};

/// Abstraction for filesystem operations.
pub trait FileSystem: Send + Sync {
    /// The error type for filesystem operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reads the contents of a file as a string.
    fn read_file(&self, path: &Path) -> Result<String, Self::Error>;

    /// Lists all entries in a directory.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>, Self::Error>;
}

/// The real filesystem, via `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    type Error = std::io::Error;

    fn read_file(&self, path: &Path) -> Result<String, Self::Error> {
        std::fs::read_to_string(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>, Self::Error> {
        std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect()
    }
}

/// Errors that can occur while loading criteria.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// IO error reading a file or directory
    #[error("IO error reading {0}: {1}")]
    Io(PathBuf, Box<dyn std::error::Error + Send + Sync>),

    /// The text is not JSON
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A file is not JSON
    #[error("parse error in {0}: {1}")]
    Parse(PathBuf, serde_json::Error),

    /// The JSON is not valid criteria
    #[error("{0}")]
    Config(#[from] ConfigErrors),

    /// The file name has no usable stem
    #[error("invalid filename: {0}")]
    InvalidFileName(PathBuf),

    /// Registration failed
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Several files failed
    #[error("multiple errors: {0:?}")]
    Multiple(Vec<LoadError>),
}

impl Criteria {
    /// Parses criteria from JSON text with default options.
    ///
    /// ```rust
    /// use reqguard::Criteria;
    ///
    /// let criteria = Criteria::from_json_str(r#"{"query": [{"page": {"$type": "number"}}]}"#).unwrap();
    /// assert!(criteria.section("query").is_some());
    /// ```
    pub fn from_json_str(text: &str) -> Result<Self, LoadError> {
        Self::from_json_str_with(text, &ValidatorOptions::default())
    }

    /// Parses criteria from JSON text with explicit options.
    pub fn from_json_str_with(text: &str, options: &ValidatorOptions) -> Result<Self, LoadError> {
        let raw: Value = serde_json::from_str(text)?;
        Ok(Self::parse_with(&raw, options)?)
    }

    /// Reads and parses a criteria file with default options.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let raw = read_json(path, &StdFileSystem)?;
        Ok(Self::parse(&raw)?)
    }
}

impl CriteriaRegistry {
    /// Registers every `*.json` file in a directory under its file stem.
    ///
    /// Files that load are registered even when others fail.
    pub fn load_dir(&self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        self.load_dir_with(path, &StdFileSystem)
    }

    /// Same as [`load_dir`](Self::load_dir), through a custom filesystem.
    pub fn load_dir_with<Fs: FileSystem>(
        &self,
        path: impl AsRef<Path>,
        fs: &Fs,
    ) -> Result<(), LoadError> {
        let path = path.as_ref();
        let mut files = fs
            .read_dir(path)
            .map_err(|e| LoadError::Io(path.to_path_buf(), Box::new(e)))?;
        files.sort();

        let mut errors: Vec<LoadError> = files
            .iter()
            .filter(|file| file.extension().and_then(|s| s.to_str()) == Some("json"))
            .filter_map(|file| self.load_file(file, fs).err())
            .collect();

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(LoadError::Multiple(errors)),
        }
    }

    fn load_file<Fs: FileSystem>(&self, path: &Path, fs: &Fs) -> Result<(), LoadError> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| LoadError::InvalidFileName(path.to_path_buf()))?;

        let raw = read_json(path, fs)?;
        self.register(name, &raw)?;
        tracing::debug!(target: "reqguard", file = %path.display(), route = name, "criteria loaded");
        Ok(())
    }
}

fn read_json<Fs: FileSystem>(path: &Path, fs: &Fs) -> Result<Value, LoadError> {
    let content = fs
        .read_file(path)
        .map_err(|e| LoadError::Io(path.to_path_buf(), Box::new(e)))?;
    serde_json::from_str(&content).map_err(|e| LoadError::Parse(path.to_path_buf(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Debug)]
    struct MockFileSystemError(String);

    impl std::fmt::Display for MockFileSystemError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl std::error::Error for MockFileSystemError {}

    struct MockFileSystem {
        files: HashMap<PathBuf, String>,
    }

    impl MockFileSystem {
        fn new() -> Self {
            Self {
                files: HashMap::new(),
            }
        }

        fn add_file(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
            self.files.insert(path.into(), content.into());
        }
    }

    impl FileSystem for MockFileSystem {
        type Error = MockFileSystemError;

        fn read_file(&self, path: &Path) -> Result<String, Self::Error> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| MockFileSystemError(format!("File not found: {}", path.display())))
        }

        fn read_dir(&self, _path: &Path) -> Result<Vec<PathBuf>, Self::Error> {
            Ok(self.files.keys().cloned().collect())
        }
    }

    #[test]
    fn test_from_json_str() {
        let criteria =
            Criteria::from_json_str(r#"{"body": [{"email": {"$req": true}}]}"#).unwrap();
        assert_eq!(criteria.section("body").unwrap().len(), 1);
    }

    #[test]
    fn test_from_json_str_reports_syntax_and_config_errors() {
        assert!(matches!(
            Criteria::from_json_str("{not json"),
            Err(LoadError::Json(_))
        ));
        assert!(matches!(
            Criteria::from_json_str(r#"{"body": {}}"#),
            Err(LoadError::Config(_))
        ));
    }

    #[test]
    fn test_load_dir_registers_by_stem() {
        let mut fs = MockFileSystem::new();
        fs.add_file("create_user.json", r#"{"body": [{"email": {"$req": true}}]}"#);
        fs.add_file("export.json", r#"{"params": [{"kind": {"$in": ["xlsx"]}}]}"#);
        fs.add_file("README.md", "not criteria");

        let registry = CriteriaRegistry::new();
        registry.load_dir_with(".", &fs).unwrap();

        assert_eq!(registry.names(), vec!["create_user", "export"]);
        let verdict = registry
            .validate("export", &json!({"params": {"kind": "docx"}}))
            .unwrap();
        assert!(verdict.is_invalid());
    }

    #[test]
    fn test_load_dir_accumulates_errors() {
        let mut fs = MockFileSystem::new();
        fs.add_file("valid.json", r#"{"body": [{"a": {"$req": true}}]}"#);
        fs.add_file("broken.json", "not valid json");
        fs.add_file("bad_schema.json", r#"{"body": [{"a": {"b": {}, "$eq": 1}}]}"#);

        let registry = CriteriaRegistry::new();
        let result = registry.load_dir_with(".", &fs);

        match result {
            Err(LoadError::Multiple(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected multiple errors, got {:?}", other),
        }
        assert!(registry.get("valid").is_some());
        assert!(registry.get("broken").is_none());
    }

    #[test]
    fn test_load_dir_single_error_is_unwrapped() {
        let mut fs = MockFileSystem::new();
        fs.add_file("broken.json", "[");

        let registry = CriteriaRegistry::new();
        assert!(matches!(
            registry.load_dir_with(".", &fs),
            Err(LoadError::Parse(_, _))
        ));
    }

    #[test]
    fn test_duplicate_registration_through_loader() {
        let mut fs = MockFileSystem::new();
        fs.add_file("route.json", r#"{"body": []}"#);

        let registry = CriteriaRegistry::new();
        registry.register("route", &json!({"body": []})).unwrap();

        assert!(matches!(
            registry.load_dir_with(".", &fs),
            Err(LoadError::Registry(RegistryError::DuplicateName(_)))
        ));
    }
}
