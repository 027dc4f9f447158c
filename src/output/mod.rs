//! Output reporters for different formats
//!
//! Renders the parse outcome of each migration file as human-readable text
//! or JSON.

use crate::input::LoadError;
use crate::parser::{Direction, MigrationDocument};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error writing report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Parse from config string. Case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// The parse outcome for one migration file.
#[derive(Debug)]
pub struct FileReport {
    pub file: PathBuf,
    pub outcome: Result<MigrationDocument, LoadError>,
}

impl FileReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Trait for output format reporters.
pub trait Reporter {
    /// Write one entry per file to `out`.
    fn emit(&self, reports: &[FileReport], out: &mut dyn Write) -> Result<(), ReportError>;
}

/// Human-readable plan of each file's statements.
pub struct TextReporter {
    /// Only show this direction's statements; both when `None`.
    pub direction: Option<Direction>,
}

impl TextReporter {
    pub fn new(direction: Option<Direction>) -> Self {
        Self { direction }
    }
}

/// One JSON array with an object per file.
pub struct JsonReporter {
    pub direction: Option<Direction>,
}

impl JsonReporter {
    pub fn new(direction: Option<Direction>) -> Self {
        Self { direction }
    }
}

/// Build the reporter for `format`.
pub fn reporter_for(format: OutputFormat, direction: Option<Direction>) -> Box<dyn Reporter> {
    match format {
        OutputFormat::Text => Box::new(TextReporter::new(direction)),
        OutputFormat::Json => Box::new(JsonReporter::new(direction)),
    }
}

/// The directions a reporter shows, in display order.
fn shown_directions(filter: Option<Direction>) -> Vec<Direction> {
    match filter {
        Some(Direction::None) | None => vec![Direction::Up, Direction::Down],
        Some(direction) => vec![direction],
    }
}

/// Convert a file path to a string with forward slashes.
fn path_to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

pub mod json;
pub mod text;
