//! JSON output reporter
//!
//! Emits one array with an entry per file. Parsed files carry their
//! statements per direction; failed files carry the error message.

use crate::output::{
    FileReport, JsonReporter, ReportError, Reporter, path_to_forward_slashes, shown_directions,
};
use crate::parser::{Direction, StatementBlock};
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct JsonFile<'a> {
    file: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sections: Vec<JsonSection<'a>>,
}

#[derive(Serialize)]
struct JsonSection<'a> {
    direction: Direction,
    disable_transaction: bool,
    statements: &'a [StatementBlock],
}

fn to_json_file<'a>(report: &'a FileReport, directions: &[Direction]) -> JsonFile<'a> {
    let file = path_to_forward_slashes(&report.file);
    match &report.outcome {
        Ok(doc) => JsonFile {
            file,
            ok: true,
            error: None,
            sections: directions
                .iter()
                .map(|&direction| JsonSection {
                    direction,
                    disable_transaction: doc.disable_transaction(direction),
                    statements: doc.statements(direction),
                })
                .collect(),
        },
        Err(err) => JsonFile {
            file,
            ok: false,
            error: Some(err.to_string()),
            sections: Vec::new(),
        },
    }
}

impl Reporter for JsonReporter {
    fn emit(&self, reports: &[FileReport], out: &mut dyn Write) -> Result<(), ReportError> {
        let directions = shown_directions(self.direction);
        let files: Vec<JsonFile<'_>> = reports
            .iter()
            .map(|r| to_json_file(r, &directions))
            .collect();

        let json = serde_json::to_string_pretty(&files)
            .map_err(|e| ReportError::Serialization(e.to_string()))?;

        out.write_all(json.as_bytes())?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }
}
