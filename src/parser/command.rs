//! Annotation recognition
//!
//! Command lines start at column 0 with [`COMMAND_PREFIX`] and carry a
//! command name followed by free-form options:
//!
//! ```text
//! -- +migrate Up notransaction
//! -- +migrate StatementBegin
//! ```

use std::str::FromStr;

use strum_macros::{Display, EnumIter, EnumString};

use crate::parser::ParseError;

/// Prefix that marks a line as a migration command.
pub const COMMAND_PREFIX: &str = "-- +migrate ";

/// Option on `Up`/`Down` that disables the wrapping transaction.
pub const OPTION_NO_TRANSACTION: &str = "notransaction";

/// The annotation names the parser understands.
///
/// Names are matched case-sensitively. Anything else after the prefix is
/// ignored so that newer scripts still load in older parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
pub enum CommandKind {
    Up,
    Down,
    StatementBegin,
    StatementEnd,
    LoopBegin,
    LoopEnd,
    ConditionalBegin,
    ConditionalEnd,
}

/// A parsed command line: the name plus any options that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrateCommand {
    pub name: String,
    pub options: Vec<String>,
}

impl MigrateCommand {
    /// The recognized kind, or `None` for an annotation this parser does not know.
    pub fn kind(&self) -> Option<CommandKind> {
        CommandKind::from_str(&self.name).ok()
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

/// Whether `line` is a command line.
pub fn is_command(line: &str) -> bool {
    line.starts_with(COMMAND_PREFIX)
}

/// Whether `line` is an ordinary `--` comment that is not a command.
pub fn is_plain_comment(line: &str) -> bool {
    line.starts_with("--") && !is_command(line)
}

/// Split a command line into its name and options.
///
/// Returns `Ok(None)` when the line is not a command at all, and
/// [`ParseError::MalformedCommand`] when the prefix is followed by nothing.
pub fn parse_command(line: &str, line_no: usize) -> Result<Option<MigrateCommand>, ParseError> {
    let Some(rest) = line.strip_prefix(COMMAND_PREFIX) else {
        return Ok(None);
    };

    let mut fields = rest.split_whitespace().map(str::to_string);
    let name = fields
        .next()
        .ok_or(ParseError::MalformedCommand { line: line_no })?;

    Ok(Some(MigrateCommand {
        name,
        options: fields.collect(),
    }))
}
