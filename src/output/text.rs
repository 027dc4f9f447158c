//! Human-readable text output reporter
//!
//! ```text
//! db/migrations/1_init.sql
//!   up (transaction): 1 statement(s)
//!     line 2: CREATE TABLE users ( ...
//!   down (no transaction): 1 statement(s)
//!     line 7, loop: DELETE FROM users WHERE id IN ( ...
//!       until: SELECT count(*) FROM users;
//! ```

use crate::input::LoadError;
use crate::output::{
    FileReport, ReportError, Reporter, TextReporter, path_to_forward_slashes, shown_directions,
};
use crate::parser::{Direction, MigrationDocument, StatementBlock};
use std::fmt::Write as FmtWrite;
use std::io::Write;

/// First non-blank line of `text`, with ` ...` when more lines follow.
fn summarize(text: &str) -> String {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    match (lines.next(), lines.next()) {
        (Some(first), Some(_)) => format!("{first} ..."),
        (Some(first), None) => first.to_string(),
        (None, _) => "(empty)".to_string(),
    }
}

fn format_block(block: &StatementBlock) -> String {
    let mut buf = String::new();
    let kind = if block.is_loop { ", loop" } else { "" };
    // Writing to a String cannot fail.
    let _ = writeln!(buf, "    line {}{}: {}", block.line, kind, summarize(&block.text));
    if !block.conditional.trim().is_empty() {
        let _ = writeln!(buf, "      until: {}", summarize(&block.conditional));
    }
    buf
}

fn format_document(doc: &MigrationDocument, directions: &[Direction]) -> String {
    let mut buf = String::new();
    for &direction in directions {
        let mode = if doc.disable_transaction(direction) {
            "no transaction"
        } else {
            "transaction"
        };
        let statements = doc.statements(direction);
        let _ = writeln!(
            buf,
            "  {} ({}): {} statement(s)",
            direction,
            mode,
            statements.len()
        );
        for block in statements {
            buf.push_str(&format_block(block));
        }
    }
    buf
}

/// Format one file's entry.
fn format_report(report: &FileReport, directions: &[Direction]) -> String {
    let mut buf = String::new();
    let _ = writeln!(buf, "{}", path_to_forward_slashes(&report.file));
    match &report.outcome {
        Ok(doc) => buf.push_str(&format_document(doc, directions)),
        Err(err) => {
            let _ = writeln!(buf, "  error: {}", error_message(err));
        }
    }
    buf
}

/// The underlying cause, without the path the header already shows.
fn error_message(err: &LoadError) -> String {
    match err {
        LoadError::Parse { source, .. } => source.to_string(),
        LoadError::Io { source, .. } => source.to_string(),
    }
}

/// Format all reports, separated by blank lines.
fn format_all(reports: &[FileReport], directions: &[Direction]) -> String {
    reports
        .iter()
        .map(|r| format_report(r, directions))
        .collect::<Vec<_>>()
        .join("\n")
}

impl Reporter for TextReporter {
    fn emit(&self, reports: &[FileReport], out: &mut dyn Write) -> Result<(), ReportError> {
        let text = format_all(reports, &shown_directions(self.direction));
        out.write_all(text.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}
