//! Reading and writing the version keys of a `pyproject.toml`.
//!
//! A Python project may carry its version under two keys: `project.version`
//! (the standard metadata table) and `tool.poetry.version` (legacy Poetry
//! layout). Edits always write `project.version` and keep
//! `tool.poetry.version` in sync when it already exists, but never create it.
//!
//! Re-serializing through [`toml`] keeps key order but drops comments and
//! whitespace formatting.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use toml::{Table, Value};
use tracing::debug;

use crate::version::Version;

const PROJECT_KEY: &str = "project.version";
const POETRY_KEY: &str = "tool.poetry.version";

/// Failures from the pyproject plumbing layer.
#[derive(thiserror::Error, Debug)]
pub enum PyProjectError {
    /// The file could not be read.
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML.
    #[error("failed to parse {path:?} as TOML: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The canonical version key is absent.
    #[error("no `{PROJECT_KEY}` key in {path:?}")]
    MissingVersion { path: PathBuf },

    /// A version key holds a non-string value.
    #[error("`{key}` in {path:?} is not a string")]
    NotAString { path: PathBuf, key: &'static str },

    /// The two version keys differ textually.
    #[error(
        "version keys disagree in {path:?}: `{PROJECT_KEY}` is `{project}` \
         but `{POETRY_KEY}` is `{poetry}`"
    )]
    KeyMismatch {
        path: PathBuf,
        project: String,
        poetry: String,
    },

    /// A stored version string failed to parse.
    #[error(transparent)]
    Version(#[from] crate::Error),

    /// The rewritten file could not be persisted.
    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for this module.
pub type PyProjectResult<T> = std::result::Result<T, PyProjectError>;

/// A loaded `pyproject.toml`: the path it came from plus its parsed table.
#[derive(Debug, Clone)]
pub struct PyProject {
    path: PathBuf,
    doc: Table,
}

impl PyProject {
    /// Reads and parses the file at `path`.
    pub fn load(path: impl Into<PathBuf>) -> PyProjectResult<Self> {
        let path = path.into();
        let text = fs::read_to_string(&path).map_err(|source| PyProjectError::Read {
            path: path.clone(),
            source,
        })?;
        let doc: Table = toml::from_str(&text).map_err(|source| PyProjectError::Parse {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "loaded pyproject");
        Ok(Self { path, doc })
    }

    /// The path this document was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn raw_at(&self, keys: &[&str], key_name: &'static str) -> PyProjectResult<Option<&str>> {
        let mut value: &Value = match self.doc.get(keys[0]) {
            Some(value) => value,
            None => return Ok(None),
        };
        for key in &keys[1..] {
            value = match value.as_table().and_then(|table| table.get(*key)) {
                Some(value) => value,
                None => return Ok(None),
            };
        }
        match value.as_str() {
            Some(text) => Ok(Some(text)),
            None => Err(PyProjectError::NotAString {
                path: self.path.clone(),
                key: key_name,
            }),
        }
    }

    /// The parsed `project.version`, or `MissingVersion` when absent.
    pub fn project_version(&self) -> PyProjectResult<Version> {
        match self.raw_at(&["project", "version"], PROJECT_KEY)? {
            Some(text) => Ok(Version::parse(text)?),
            None => Err(PyProjectError::MissingVersion {
                path: self.path.clone(),
            }),
        }
    }

    /// The parsed `tool.poetry.version`, or `None` when the key is absent.
    pub fn poetry_version(&self) -> PyProjectResult<Option<Version>> {
        match self.raw_at(&["tool", "poetry", "version"], POETRY_KEY)? {
            Some(text) => Ok(Some(Version::parse(text)?)),
            None => Ok(None),
        }
    }

    /// The project version, after checking that the two keys agree.
    ///
    /// The comparison is textual: the keys are duplicates and must match
    /// byte for byte, not merely parse to equal versions.
    pub fn version(&self) -> PyProjectResult<Version> {
        let project = self
            .raw_at(&["project", "version"], PROJECT_KEY)?
            .ok_or_else(|| PyProjectError::MissingVersion {
                path: self.path.clone(),
            })?;
        if let Some(poetry) = self.raw_at(&["tool", "poetry", "version"], POETRY_KEY)? {
            if poetry != project {
                return Err(PyProjectError::KeyMismatch {
                    path: self.path.clone(),
                    project: project.to_owned(),
                    poetry: poetry.to_owned(),
                });
            }
        }
        Ok(Version::parse(project)?)
    }

    /// Writes `version` into `project.version` (creating the table if
    /// needed) and into `tool.poetry.version` only when that key already
    /// exists.
    pub fn set_version(&mut self, version: &Version) {
        let text = version.to_string();
        let project = self
            .doc
            .entry("project")
            .or_insert_with(|| Value::Table(Table::new()));
        if let Some(table) = project.as_table_mut() {
            table.insert("version".to_owned(), Value::String(text.clone()));
        }
        let poetry_present = self
            .doc
            .get("tool")
            .and_then(Value::as_table)
            .and_then(|tool| tool.get("poetry"))
            .and_then(Value::as_table)
            .is_some_and(|poetry| poetry.contains_key("version"));
        if poetry_present {
            if let Some(poetry) = self
                .doc
                .get_mut("tool")
                .and_then(Value::as_table_mut)
                .and_then(|tool| tool.get_mut("poetry"))
                .and_then(Value::as_table_mut)
            {
                poetry.insert("version".to_owned(), Value::String(text.clone()));
            }
        }
        debug!(version = %text, poetry = poetry_present, "updated version keys");
    }

    /// Serializes the document and atomically replaces the file: the new
    /// content goes to a named temporary file in the same directory, which
    /// is then renamed over the original.
    pub fn save(&self) -> PyProjectResult<()> {
        let text = toml::to_string(&self.doc).map_err(|source| PyProjectError::Write {
            path: self.path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, source),
        })?;
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut file =
            tempfile::NamedTempFile::new_in(dir).map_err(|source| PyProjectError::Write {
                path: self.path.clone(),
                source,
            })?;
        file.write_all(text.as_bytes())
            .map_err(|source| PyProjectError::Write {
                path: self.path.clone(),
                source,
            })?;
        file.persist(&self.path)
            .map_err(|error| PyProjectError::Write {
                path: self.path.clone(),
                source: error.error,
            })?;
        debug!(path = %self.path.display(), "saved pyproject");
        Ok(())
    }
}
