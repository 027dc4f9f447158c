//! Migration loading
//!
//! Finds migration scripts on disk and parses each one into a
//! [`MigrationDocument`].

use crate::parser::{MigrationDocument, ParseError};
use std::path::PathBuf;
use thiserror::Error;

pub mod sql;

/// One parsed migration script.
#[derive(Debug, Clone)]
pub struct MigrationFile {
    /// Identifier for ordering/logging: the file name.
    pub id: String,

    /// The file the document was parsed from.
    pub source_file: PathBuf,

    pub document: MigrationDocument,
}

/// Migration files in the order they apply.
#[derive(Debug)]
pub struct MigrationSet {
    pub files: Vec<MigrationFile>,
}

/// Trait for migration loaders.
pub trait MigrationLoader {
    /// Load migrations from the given paths, in application order.
    fn load(&self, paths: &[PathBuf]) -> Result<MigrationSet, LoadError>;
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

impl LoadError {
    /// The file or directory the error refers to.
    pub fn path(&self) -> &PathBuf {
        match self {
            LoadError::Io { path, .. } | LoadError::Parse { path, .. } => path,
        }
    }
}
