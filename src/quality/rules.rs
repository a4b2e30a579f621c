use crate::dates::is_valid_date;
use crate::model::{Row, RowField};

pub const MIN_QUESTION_LENGTH: usize = 10;

/// Length in UTF-16 code units, the unit the length threshold is stated in.
pub fn question_length(question: &str) -> usize {
    question.encode_utf16().count()
}

/// Whether the row has at least one problem worth flagging in an upload
/// summary. Independent of the issue list: one row counts once no matter how
/// many rules it breaks.
pub fn row_has_problem(row: &Row) -> bool {
    let any_empty = RowField::ALL
        .into_iter()
        .any(|field| row.get(field).trim().is_empty());
    let question = row.question.trim();
    let short_question = question_length(question) < MIN_QUESTION_LENGTH || question == "?";
    let output = row.output.trim();
    let bad_output = output.is_empty() || output.contains('?');

    any_empty || short_question || bad_output || !is_valid_date(&row.updated_at)
}
