//! SQL file loading
//!
//! Reads `.sql` migration scripts from disk and parses them with a
//! [`MigrationParser`].

use crate::input::{LoadError, MigrationFile, MigrationLoader, MigrationSet};
use crate::parser::{MigrationParser, ParseError};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Loader for annotated SQL migration scripts.
///
/// Reads `.sql` files from the configured directories (non-recursive) and
/// explicit file paths, sorted lexicographically by filename. Each file
/// becomes one [`MigrationFile`].
#[derive(Debug, Clone, Default)]
pub struct SqlLoader {
    parser: MigrationParser,
}

impl SqlLoader {
    pub fn new(parser: MigrationParser) -> Self {
        Self { parser }
    }

    pub fn parser(&self) -> &MigrationParser {
        &self.parser
    }

    /// Resolve `paths` to the sorted list of script files they name.
    ///
    /// Directories contribute their `.sql` entries; file paths are taken as
    /// given if they have a `.sql` extension. A path that does not exist is
    /// an error.
    pub fn collect(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>, LoadError> {
        let mut sql_files: Vec<PathBuf> = Vec::new();

        for path in paths {
            if path.is_dir() {
                let entries = collect_sql_files(path)?;
                sql_files.extend(entries);
            } else if path.is_file() {
                if is_sql_file(path) {
                    sql_files.push(path.clone());
                }
            } else {
                return Err(LoadError::Io {
                    path: path.clone(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("Path does not exist: {}", path.display()),
                    ),
                });
            }
        }

        // Sort lexicographically by filename to ensure deterministic ordering
        sql_files.sort_by(|a, b| {
            let a_name = a.file_name().unwrap_or_default();
            let b_name = b.file_name().unwrap_or_default();
            a_name.cmp(b_name)
        });

        Ok(sql_files)
    }

    /// Parse every file under `paths`, keeping each file's outcome.
    ///
    /// Unlike [`MigrationLoader::load`], a broken script does not stop the
    /// others from being parsed.
    pub fn load_each(
        &self,
        paths: &[PathBuf],
    ) -> Result<Vec<(PathBuf, Result<MigrationFile, LoadError>)>, LoadError> {
        let files = self.collect(paths)?;
        Ok(files
            .into_iter()
            .map(|file| {
                let outcome = self.load_file(&file);
                (file, outcome)
            })
            .collect())
    }

    /// Load a single script and parse it into a [`MigrationFile`].
    pub fn load_file(&self, path: &Path) -> Result<MigrationFile, LoadError> {
        let mut file = File::open(path).map_err(|e| LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let document = self.parser.parse(&mut file).map_err(|e| match e {
            ParseError::Stream(source) => LoadError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => LoadError::Parse {
                path: path.to_path_buf(),
                source: other,
            },
        })?;

        let filename = path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        tracing::info!(
            file = %filename,
            up = document.up_statements.len(),
            down = document.down_statements.len(),
            "parsed migration"
        );

        Ok(MigrationFile {
            id: filename,
            source_file: path.to_path_buf(),
            document,
        })
    }
}

impl MigrationLoader for SqlLoader {
    /// Load and parse every script; the first failure aborts.
    fn load(&self, paths: &[PathBuf]) -> Result<MigrationSet, LoadError> {
        let mut files = Vec::new();
        for file in self.collect(paths)? {
            files.push(self.load_file(&file)?);
        }

        Ok(MigrationSet { files })
    }
}

/// Collect all `.sql` files from a directory (non-recursive).
fn collect_sql_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let entries = std::fs::read_dir(dir).map_err(|e| LoadError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files: Vec<PathBuf> = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| LoadError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();
        if path.is_file() && is_sql_file(&path) {
            files.push(path);
        }
    }

    Ok(files)
}

/// Check if a path has a `.sql` extension.
fn is_sql_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("sql"))
        .unwrap_or(false)
}
