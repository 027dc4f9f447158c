//! Block state machine
//!
//! The scanner walks a script one line at a time. Its block state is one of
//! three shapes, so a conditional outside a loop cannot be represented:
//!
//! ```text
//! Open --StatementBegin--> Statement --StatementEnd--> Open (conclude)
//! Open --LoopBegin-------> Loop --ConditionalBegin--> Loop(conditional)
//!                          Loop <--ConditionalEnd---- Loop(conditional)
//!                          Loop --LoopEnd-----------> Open (conclude loop)
//! ```
//!
//! Every `(state, command)` pair is resolved in [`BlockState::transition`].

use crate::parser::ParseError;
use crate::parser::boundary::{ends_with_semicolon, is_line_separator};
use crate::parser::command::{
    CommandKind, OPTION_NO_TRANSACTION, is_command, is_plain_comment, parse_command,
};
use crate::parser::document::{Direction, DocumentBuilder, MigrationDocument, StatementBlock};

/// Which explicit block, if any, the scanner is inside.
///
/// Line numbers record where each block was opened, for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum BlockState {
    /// Terminators and separators conclude statements.
    #[default]
    Open,
    /// Inside `StatementBegin`..`StatementEnd`.
    Statement { opened_at: usize },
    /// Inside `LoopBegin`..`LoopEnd`; `conditional` is set while the loop's
    /// `ConditionalBegin`..`ConditionalEnd` region is open.
    Loop {
        opened_at: usize,
        conditional: Option<usize>,
    },
}

/// Side effect a transition asks the scanner to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Effect {
    None,
    /// Change the current direction (`Up`/`Down`).
    SwitchDirection(Direction),
    /// A loop opened: the current direction cannot run in one transaction.
    DisableTransaction,
    /// Flush the pending text now, regardless of terminators.
    Conclude { is_loop: bool },
}

impl BlockState {
    /// True while terminators and separators are ignored.
    pub(crate) fn suppresses_terminators(&self) -> bool {
        !matches!(self, BlockState::Open)
    }

    /// Line of the `StatementBegin`/`LoopBegin` that opened the current block.
    pub(crate) fn opened_at(&self) -> Option<usize> {
        match self {
            BlockState::Open => None,
            BlockState::Statement { opened_at } | BlockState::Loop { opened_at, .. } => {
                Some(*opened_at)
            }
        }
    }

    pub(crate) fn conditional_opened_at(&self) -> Option<usize> {
        match self {
            BlockState::Loop { conditional, .. } => *conditional,
            _ => None,
        }
    }

    pub(crate) fn in_conditional(&self) -> bool {
        matches!(
            self,
            BlockState::Loop {
                conditional: Some(_),
                ..
            }
        )
    }

    /// Resolve a recognized command against the current state.
    ///
    /// `has_direction` is false until the first `Up`/`Down`; blocks cannot be
    /// opened before that.
    pub(crate) fn transition(
        self,
        command: CommandKind,
        line: usize,
        has_direction: bool,
    ) -> Result<(BlockState, Effect), ParseError> {
        use BlockState::*;
        use CommandKind as C;

        let next = match (self, command) {
            (_, C::Up) => (self, Effect::SwitchDirection(Direction::Up)),
            (_, C::Down) => (self, Effect::SwitchDirection(Direction::Down)),

            (Loop { .. }, C::StatementBegin) => {
                return Err(ParseError::NestedBlock {
                    line,
                    command,
                    enclosing: "a loop or conditional block",
                });
            }
            (Open, C::StatementBegin) if has_direction => {
                (Statement { opened_at: line }, Effect::None)
            }
            (_, C::StatementBegin) => (self, Effect::None),

            (Statement { .. }, C::StatementEnd) => (Open, Effect::Conclude { is_loop: false }),
            // End markers inside a loop belong to the loop.
            (_, C::StatementEnd) => (self, Effect::None),

            (Loop { opened_at, conditional }, C::ConditionalBegin) => (
                Loop {
                    opened_at,
                    conditional: conditional.or(Some(line)),
                },
                Effect::None,
            ),
            (_, C::ConditionalBegin) => return Err(ParseError::ConditionalOutsideLoop { line }),

            (Loop { opened_at, .. }, C::ConditionalEnd) => (
                Loop {
                    opened_at,
                    conditional: None,
                },
                Effect::None,
            ),
            (_, C::ConditionalEnd) => (self, Effect::None),

            (Statement { .. }, C::LoopBegin) => {
                return Err(ParseError::NestedBlock {
                    line,
                    command,
                    enclosing: "a statement block",
                });
            }
            (Loop { .. }, C::LoopBegin) => {
                return Err(ParseError::NestedBlock {
                    line,
                    command,
                    enclosing: "another loop",
                });
            }
            (Open, C::LoopBegin) if has_direction => (
                Loop {
                    opened_at: line,
                    conditional: None,
                },
                Effect::DisableTransaction,
            ),
            (Open, C::LoopBegin) => (self, Effect::None),

            (
                Loop {
                    conditional: Some(opened_at),
                    ..
                },
                C::LoopEnd,
            ) => return Err(ParseError::UnclosedConditional { line, opened_at }),
            (Loop { .. }, C::LoopEnd) => (Open, Effect::Conclude { is_loop: true }),
            // Tolerated: a stray LoopEnd outside any loop.
            (_, C::LoopEnd) => (self, Effect::None),
        };

        Ok(next)
    }
}

/// Text waiting to become part of a statement block.
#[derive(Debug, Default)]
struct PendingText {
    text: String,
    /// First line with non-whitespace content.
    first_line: Option<usize>,
}

impl PendingText {
    fn push_line(&mut self, line: &str, line_no: usize) {
        if !line.trim().is_empty() {
            self.first_line.get_or_insert(line_no);
        }
        self.text.push_str(line);
        self.text.push('\n');
    }

    fn take(&mut self) -> (String, Option<usize>) {
        (std::mem::take(&mut self.text), self.first_line.take())
    }

    fn has_content(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Per-parse working state. Created for one script and consumed by [`Scanner::finish`].
#[derive(Debug)]
pub(crate) struct Scanner<'a> {
    separator: Option<&'a str>,
    direction: Direction,
    block: BlockState,
    statement: PendingText,
    conditional: PendingText,
    builder: DocumentBuilder,
    last_line: usize,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(separator: Option<&'a str>) -> Self {
        Self {
            separator: separator.filter(|s| !s.is_empty()),
            direction: Direction::None,
            block: BlockState::Open,
            statement: PendingText::default(),
            conditional: PendingText::default(),
            builder: DocumentBuilder::default(),
            last_line: 0,
        }
    }

    /// Process one line of input. `line_no` is 1-based.
    pub(crate) fn feed_line(&mut self, line: &str, line_no: usize) -> Result<(), ParseError> {
        self.last_line = line_no;

        if is_plain_comment(line) {
            return Ok(());
        }

        let mut conclude = None;
        if let Some(command) = parse_command(line, line_no)? {
            match command.kind() {
                Some(kind) => {
                    let (next, effect) =
                        self.block
                            .transition(kind, line_no, self.direction.is_set())?;
                    self.block = next;
                    match effect {
                        Effect::None => {}
                        Effect::SwitchDirection(direction) => {
                            self.switch_direction(
                                direction,
                                command.has_option(OPTION_NO_TRANSACTION),
                                line_no,
                            )?;
                        }
                        Effect::DisableTransaction => {
                            self.builder.disable_transaction(self.direction);
                        }
                        Effect::Conclude { is_loop } => conclude = Some(is_loop),
                    }
                }
                None => {
                    tracing::debug!(line = line_no, name = %command.name, "ignoring unknown annotation");
                }
            }
        }

        if !self.direction.is_set() {
            return Ok(());
        }

        let suppressed = self.block.suppresses_terminators();
        let is_separator = !suppressed && is_line_separator(line, self.separator);

        if !is_separator && !is_command(line) {
            self.active_buffer().push_line(line, line_no);
        }

        let at_boundary = !suppressed && (is_separator || ends_with_semicolon(line));
        if at_boundary || conclude.is_some() {
            self.flush(conclude.unwrap_or(false), line_no);
        }

        Ok(())
    }

    /// Run the end-of-input checks and return the finished document.
    pub(crate) fn finish(self) -> Result<MigrationDocument, ParseError> {
        let pending_line = self.statement.first_line.unwrap_or(self.last_line);
        self.builder.finish(
            self.block,
            self.direction,
            &self.statement.text,
            pending_line,
            self.separator,
        )
    }

    fn switch_direction(
        &mut self,
        direction: Direction,
        no_transaction: bool,
        line_no: usize,
    ) -> Result<(), ParseError> {
        if self.statement.has_content() {
            return Err(ParseError::UnterminatedStatement {
                line: self.statement.first_line.unwrap_or(line_no),
                separator: self.separator.map(str::to_string),
            });
        }

        self.direction = direction;
        if no_transaction {
            self.builder.disable_transaction(direction);
        }
        Ok(())
    }

    /// The buffer the current line belongs to: the conditional inside an
    /// open conditional region, the statement otherwise.
    fn active_buffer(&mut self) -> &mut PendingText {
        if self.block.in_conditional() {
            &mut self.conditional
        } else {
            &mut self.statement
        }
    }

    fn flush(&mut self, is_loop: bool, line_no: usize) {
        let (text, first_line) = self.statement.take();
        let (conditional, _) = self.conditional.take();
        let line = first_line.unwrap_or(line_no);

        let block = if is_loop {
            StatementBlock::looped(text, conditional, line)
        } else {
            StatementBlock::statement(text, line)
        };

        tracing::debug!(
            direction = %self.direction,
            line = block.line,
            is_loop = block.is_loop,
            "statement concluded"
        );
        self.builder.push(self.direction, block);
    }
}
