//! Parser output and the builder that assembles it.

use serde::Serialize;

use crate::parser::ParseError;
use crate::parser::state::BlockState;

/// Which half of a migration a statement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// No `Up` or `Down` annotation seen yet.
    #[default]
    None,
    Up,
    Down,
}

impl Direction {
    pub fn is_set(&self) -> bool {
        !matches!(self, Direction::None)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::None => "none",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of work handed to the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementBlock {
    /// Accumulated body, each source line followed by `\n`.
    pub text: String,

    /// Produced by a `LoopBegin`..`LoopEnd` region. The executor re-runs
    /// `text` until `conditional` reports completion.
    pub is_loop: bool,

    /// Body of the loop's `ConditionalBegin`..`ConditionalEnd` region.
    /// Always empty when `is_loop` is false.
    pub conditional: String,

    /// 1-based source line of the block's first non-blank line, or of the
    /// line that concluded it when the block has no text.
    pub line: usize,
}

impl StatementBlock {
    pub fn statement(text: impl Into<String>, line: usize) -> Self {
        Self {
            text: text.into(),
            is_loop: false,
            conditional: String::new(),
            line,
        }
    }

    pub fn looped(text: impl Into<String>, conditional: impl Into<String>, line: usize) -> Self {
        Self {
            text: text.into(),
            is_loop: true,
            conditional: conditional.into(),
            line,
        }
    }
}

/// A fully parsed migration script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationDocument {
    pub up_statements: Vec<StatementBlock>,
    pub down_statements: Vec<StatementBlock>,

    /// Run the Up statements outside a transaction. Set by
    /// `Up notransaction` or by any loop in the Up section.
    pub disable_transaction_up: bool,

    /// Same as `disable_transaction_up`, for the Down section.
    pub disable_transaction_down: bool,
}

impl MigrationDocument {
    /// Statements for one direction. `Direction::None` has none.
    pub fn statements(&self, direction: Direction) -> &[StatementBlock] {
        match direction {
            Direction::Up => &self.up_statements,
            Direction::Down => &self.down_statements,
            Direction::None => &[],
        }
    }

    /// Whether the executor must skip the wrapping transaction for `direction`.
    pub fn disable_transaction(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.disable_transaction_up,
            Direction::Down => self.disable_transaction_down,
            Direction::None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.up_statements.is_empty() && self.down_statements.is_empty()
    }
}

/// Collects finished statements and runs the end-of-input checks.
#[derive(Debug, Default)]
pub(crate) struct DocumentBuilder {
    document: MigrationDocument,
}

impl DocumentBuilder {
    pub(crate) fn push(&mut self, direction: Direction, block: StatementBlock) {
        match direction {
            Direction::Up => self.document.up_statements.push(block),
            Direction::Down => self.document.down_statements.push(block),
            // The scanner only flushes once a direction is set.
            Direction::None => {}
        }
    }

    pub(crate) fn disable_transaction(&mut self, direction: Direction) {
        match direction {
            Direction::Up => self.document.disable_transaction_up = true,
            Direction::Down => self.document.disable_transaction_down = true,
            Direction::None => {}
        }
    }

    /// Validate the scanner's final state and hand back the document.
    ///
    /// Checks run in order and the first failure wins: terminators still
    /// suppressed, an open loop, an open conditional, a missing direction,
    /// then leftover statement text. Loops suppress terminators too, so an
    /// unclosed loop is reported as an unterminated statement block.
    pub(crate) fn finish(
        self,
        block: BlockState,
        direction: Direction,
        pending: &str,
        pending_line: usize,
        separator: Option<&str>,
    ) -> Result<MigrationDocument, ParseError> {
        if block.suppresses_terminators() {
            return Err(ParseError::UnterminatedStatementBlock {
                line: block.opened_at().unwrap_or(pending_line),
            });
        }
        if let BlockState::Loop { opened_at, .. } = block {
            return Err(ParseError::UnterminatedLoop { line: opened_at });
        }
        if let Some(opened_at) = block.conditional_opened_at() {
            return Err(ParseError::UnterminatedConditional { line: opened_at });
        }

        if !direction.is_set() {
            return Err(ParseError::NoDirectionFound);
        }

        if has_unterminated_text(pending) {
            return Err(ParseError::UnterminatedStatement {
                line: pending_line,
                separator: separator.map(str::to_string),
            });
        }

        Ok(self.document)
    }
}

/// Whether leftover buffer text is a real statement missing its terminator.
///
/// Tolerated only when every non-blank line is an indented annotation-style
/// comment (`  -- +migrate ...`).
pub(crate) fn has_unterminated_text(pending: &str) -> bool {
    pending
        .lines()
        .map(str::trim)
        .any(|line| !line.is_empty() && !line.starts_with("-- +"))
}
