use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::model::{Row, RowField};

const MIN_VALUES_PER_ROW: usize = 5;

/// What happens to a data line with fewer than five comma-separated values.
/// The line is dropped either way; `Warn` additionally logs it.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ShortRowPolicy {
    #[default]
    Skip,
    Warn,
}

#[derive(Clone, Debug, Default)]
pub struct ParseOptions {
    pub short_row_policy: ShortRowPolicy,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ParsedCsv {
    pub rows: Vec<Row>,
    /// Physical 1-based line numbers in the input text of dropped short rows,
    /// blank lines included. Issue lines number the parsed rows instead, so
    /// the two diverge once a line is blank or dropped.
    pub skipped_lines: Vec<usize>,
}

pub fn parse(text: &str) -> Result<Vec<Row>, ParseError> {
    parse_with_options(text, &ParseOptions::default()).map(|parsed| parsed.rows)
}

pub fn parse_with_options(text: &str, options: &ParseOptions) -> Result<ParsedCsv, ParseError> {
    let lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| (index + 1, line))
        .collect::<Vec<(usize, &str)>>();

    if lines.len() < 2 {
        return Err(ParseError::MalformedInput {
            usable_lines: lines.len(),
        });
    }

    let columns = ColumnLayout::from_header(lines[0].1);
    let mut rows = Vec::with_capacity(lines.len() - 1);
    let mut skipped_lines = Vec::new();

    for &(line_number, line) in &lines[1..] {
        let values = line.split(',').collect::<Vec<&str>>();
        if values.len() < MIN_VALUES_PER_ROW {
            match options.short_row_policy {
                ShortRowPolicy::Skip => {
                    debug!(line = line_number, values = values.len(), "skipped short row");
                }
                ShortRowPolicy::Warn => {
                    warn!(line = line_number, values = values.len(), "skipped short row");
                }
            }
            skipped_lines.push(line_number);
            continue;
        }

        rows.push(columns.extract(&values));
    }

    debug!(
        rows = rows.len(),
        skipped = skipped_lines.len(),
        "parsed csv text"
    );

    Ok(ParsedCsv {
        rows,
        skipped_lines,
    })
}

/// Resolved value index for each of the five fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnLayout {
    indices: [usize; 5],
}

impl ColumnLayout {
    fn from_header(line: &str) -> Self {
        let header = line
            .split(',')
            .map(|cell| cell.trim().to_lowercase())
            .collect::<Vec<String>>();

        let mut indices = [0usize; 5];
        for (slot, field) in indices.iter_mut().zip(RowField::ALL) {
            *slot = header
                .iter()
                .position(|cell| cell == field.column_name())
                .unwrap_or_else(|| field.fallback_index());
        }

        Self { indices }
    }

    fn value(&self, values: &[&str], field: RowField) -> String {
        let index = self.indices[field.fallback_index()];
        values
            .get(index)
            .map(|value| value.trim().to_string())
            .unwrap_or_default()
    }

    fn extract(&self, values: &[&str]) -> Row {
        Row {
            project_id: self.value(values, RowField::ProjectId),
            question: self.value(values, RowField::Question),
            output: self.value(values, RowField::Output),
            updated_at: self.value(values, RowField::UpdatedAt),
            source: self.value(values, RowField::Source),
        }
    }
}
