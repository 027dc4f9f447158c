//! Statement boundary detection
//!
//! Purely syntactic: string literals and block comments are not understood,
//! so a `;` at the end of a line inside a string still ends the statement.
//! Bodies like that belong in a `StatementBegin`/`StatementEnd` block.

/// Whether the last code token on `line` ends with a semicolon.
///
/// Tokens are whitespace-delimited. Scanning stops at the first token that
/// starts with `--`, so trailing comments do not hide the terminator.
pub fn ends_with_semicolon(line: &str) -> bool {
    line.split_whitespace()
        .take_while(|word| !word.starts_with("--"))
        .last()
        .is_some_and(|word| word.ends_with(';'))
}

/// Whether `line`, trimmed, is exactly the configured separator.
///
/// An unset separator never matches.
pub fn is_line_separator(line: &str, separator: Option<&str>) -> bool {
    match separator {
        Some(sep) if !sep.is_empty() => line.trim() == sep,
        _ => false,
    }
}
