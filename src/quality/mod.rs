use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::dates::is_valid_date;
use crate::model::{IssueKind, QualityIssue, Row, RowField};

mod rules;


pub use rules::{MIN_QUESTION_LENGTH, question_length, row_has_problem};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityReport {
    pub total_rows: usize,
    pub score: i64,
    pub issues: Vec<QualityIssue>,
}

impl QualityReport {
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    /// Issue tally per kind; every kind is present, zero counts included.
    pub fn counts_by_kind(&self) -> BTreeMap<IssueKind, usize> {
        let mut counts = IssueKind::ALL
            .into_iter()
            .map(|kind| (kind, 0usize))
            .collect::<BTreeMap<_, _>>();
        for issue in &self.issues {
            *counts.entry(issue.kind).or_default() += 1;
        }
        counts
    }

    pub fn issues_for_line(&self, line: usize) -> impl Iterator<Item = &QualityIssue> {
        self.issues.iter().filter(move |issue| issue.line == line)
    }
}

pub fn analyze(rows: &[Row]) -> QualityReport {
    let mut issues = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        collect_row_issues(row, index + 2, &mut issues);
    }

    let score = quality_score(rows.len(), issues.len());
    debug!(
        rows = rows.len(),
        issues = issues.len(),
        score,
        "analyzed row quality"
    );

    QualityReport {
        total_rows: rows.len(),
        score,
        issues,
    }
}

/// Rows where [`row_has_problem`] holds. Counts rows, not issues.
pub fn count_rows_with_problems(rows: &[Row]) -> usize {
    rows.iter().filter(|row| row_has_problem(row)).count()
}

/// `100 * (rows - issues) / rows`, rounded half up. Goes negative when rows
/// carry more than one issue on average.
pub fn quality_score(total_rows: usize, issue_count: usize) -> i64 {
    if total_rows == 0 {
        return 100;
    }

    let ratio = 100.0 * (total_rows as f64 - issue_count as f64) / total_rows as f64;
    (ratio + 0.5).floor() as i64
}

fn collect_row_issues(row: &Row, line: usize, issues: &mut Vec<QualityIssue>) {
    for field in RowField::ALL {
        if row.get(field).trim().is_empty() {
            issues.push(QualityIssue {
                kind: IssueKind::EmptyField,
                message: format!("Empty {field} field"),
                line,
                field,
            });
        }
    }

    if !row.updated_at.is_empty() && !is_valid_date(&row.updated_at) {
        issues.push(QualityIssue {
            kind: IssueKind::InvalidDate,
            message: format!("Invalid date format: {}", row.updated_at),
            line,
            field: RowField::UpdatedAt,
        });
    }

    let length = question_length(&row.question);
    if !row.question.is_empty() && length < MIN_QUESTION_LENGTH {
        issues.push(QualityIssue {
            kind: IssueKind::ShortQuestion,
            message: format!("Question too short ({length} characters)"),
            line,
            field: RowField::Question,
        });
    }

    if row.question.trim() == "?" {
        issues.push(QualityIssue {
            kind: IssueKind::ShortQuestion,
            message: "Question is only a question mark".to_string(),
            line,
            field: RowField::Question,
        });
    }

    if row.output.trim().is_empty() {
        issues.push(QualityIssue {
            kind: IssueKind::MissingOutput,
            message: "Output is missing".to_string(),
            line,
            field: RowField::Output,
        });
    }

    if !row.output.is_empty() && row.output.contains('?') {
        issues.push(QualityIssue {
            kind: IssueKind::FlaggedOutput,
            message: "Output contains '?' and needs review".to_string(),
            line,
            field: RowField::Output,
        });
    }
}
