//! Migration script parsing
//!
//! Splits an annotated SQL migration script into ordered statement blocks
//! for the Up and Down directions.
//!
//! The base case splits on semicolons, which naturally terminate a
//! statement. Bodies that contain their own semicolons (PL/pgSQL functions,
//! for instance) are wrapped in `StatementBegin`/`StatementEnd`, which
//! suppresses terminator detection until the end marker. `LoopBegin`/`LoopEnd`
//! mark a block the executor re-runs until its `ConditionalBegin`/
//! `ConditionalEnd` query reports completion.

pub mod boundary;
pub mod command;
pub mod document;
pub(crate) mod state;


use std::io::{BufRead, BufReader, Cursor, Read, Seek, SeekFrom};

use thiserror::Error;

pub use command::{COMMAND_PREFIX, CommandKind, MigrateCommand, OPTION_NO_TRANSACTION};
pub use document::{Direction, MigrationDocument, StatementBlock};

use crate::config::{ConfigError, ParserConfig, validate_line_separator};
use state::Scanner;

/// A terminal parse failure. A script that fails to parse must not be executed.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: incomplete migration command, expected a name after '-- +migrate '")]
    MalformedCommand { line: usize },

    #[error("line {line}: {}", unterminated_message(.separator))]
    UnterminatedStatement {
        line: usize,
        /// The configured line separator, mentioned in the message.
        separator: Option<String>,
    },

    #[error("line {line}: cannot begin '-- +migrate {command}' inside {enclosing}")]
    NestedBlock {
        line: usize,
        command: CommandKind,
        enclosing: &'static str,
    },

    #[error(
        "line {line}: saw '-- +migrate ConditionalBegin' outside of a matching '-- +migrate LoopBegin'"
    )]
    ConditionalOutsideLoop { line: usize },

    #[error(
        "line {line}: saw '-- +migrate LoopEnd' while the '-- +migrate ConditionalBegin' from line {opened_at} is still open"
    )]
    UnclosedConditional { line: usize, opened_at: usize },

    #[error(
        "line {line}: saw '-- +migrate StatementBegin' with no matching '-- +migrate StatementEnd'"
    )]
    UnterminatedStatementBlock { line: usize },

    #[error("line {line}: saw '-- +migrate LoopBegin' with no matching '-- +migrate LoopEnd'")]
    UnterminatedLoop { line: usize },

    #[error(
        "line {line}: saw '-- +migrate ConditionalBegin' with no matching '-- +migrate ConditionalEnd'"
    )]
    UnterminatedConditional { line: usize },

    #[error("no Up/Down annotations found, so no statements would be executed")]
    NoDirectionFound,

    #[error("failed to read migration script: {0}")]
    Stream(#[from] std::io::Error),
}

fn unterminated_message(separator: &Option<String>) -> String {
    match separator {
        Some(sep) => format!(
            "the last statement must be ended by a semicolon, a line whose contents are {sep:?}, or a '{COMMAND_PREFIX}StatementEnd' marker"
        ),
        None => format!(
            "the last statement must be ended by a semicolon or a '{COMMAND_PREFIX}StatementEnd' marker"
        ),
    }
}

/// Parses migration scripts. Holds the (immutable) parse configuration, so
/// one parser can be shared across threads and used for many scripts.
#[derive(Debug, Clone, Default)]
pub struct MigrationParser {
    line_separator: Option<String>,
}

impl MigrationParser {
    /// A parser that splits on semicolons and explicit end markers only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also treat a line whose trimmed contents equal `separator` as a
    /// statement boundary (e.g. `GO` for SQL Server scripts). An empty
    /// separator leaves the option unset.
    ///
    /// Fails for a separator that could never match a line: one spanning
    /// lines, padded with whitespace, or starting with `--` (comment lines
    /// are dropped before separators are checked).
    pub fn with_line_separator(
        mut self,
        separator: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let separator = separator.into();
        validate_line_separator(&separator)?;
        self.line_separator = (!separator.is_empty()).then_some(separator);
        Ok(self)
    }

    pub fn from_config(config: &ParserConfig) -> Result<Self, ConfigError> {
        Self::new().with_line_separator(config.line_separator.clone())
    }

    pub fn line_separator(&self) -> Option<&str> {
        self.line_separator.as_deref()
    }

    /// Parse a script from a seekable reader.
    ///
    /// The reader is rewound to the start first, so a handle that was
    /// already read from can be passed again.
    pub fn parse<R: Read + Seek>(&self, reader: &mut R) -> Result<MigrationDocument, ParseError> {
        reader.seek(SeekFrom::Start(0))?;

        let mut scanner = Scanner::new(self.line_separator());
        for (idx, line) in BufReader::new(reader).lines().enumerate() {
            scanner.feed_line(&line?, idx + 1)?;
        }

        scanner.finish()
    }

    /// Parse a script held in memory.
    pub fn parse_str(&self, source: &str) -> Result<MigrationDocument, ParseError> {
        self.parse(&mut Cursor::new(source.as_bytes()))
    }
}

/// Parse `source` with the default configuration.
pub fn parse_migration(source: &str) -> Result<MigrationDocument, ParseError> {
    MigrationParser::new().parse_str(source)
}
