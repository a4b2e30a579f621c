use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use annotab::{IssueKind, ParseOptions, QualityIssue, ShortRowPolicy, analyze, parse_with_options};

use crate::cli::ReportArgs;

#[derive(Debug, Serialize)]
struct ReportResponse<'a> {
    file: String,
    total_rows: usize,
    skipped_lines: &'a [usize],
    score: i64,
    issue_count: usize,
    rows_with_issues: usize,
    issues_by_kind: BTreeMap<IssueKind, usize>,
    issues: &'a [QualityIssue],
}

pub fn run(args: ReportArgs) -> Result<()> {
    let raw = fs::read(&args.file).with_context(|| format!("failed to read {}", args.file.display()))?;
    let text = String::from_utf8_lossy(&raw);

    let options = ParseOptions {
        short_row_policy: ShortRowPolicy::Warn,
    };
    let parsed = parse_with_options(&text, &options)
        .with_context(|| format!("failed to parse {}", args.file.display()))?;
    let report = analyze(&parsed.rows);

    let response = ReportResponse {
        file: args.file.display().to_string(),
        total_rows: report.total_rows,
        skipped_lines: &parsed.skipped_lines,
        score: report.score,
        issue_count: report.issue_count(),
        rows_with_issues: annotab::count_rows_with_problems(&parsed.rows),
        issues_by_kind: report.counts_by_kind(),
        issues: &report.issues,
    };

    info!(
        file = %response.file,
        rows = response.total_rows,
        issues = response.issue_count,
        score = response.score,
        "quality report built"
    );

    if args.json {
        write_json_response(&response)
    } else {
        write_text_response(&response, args.limit)
    }
}

fn write_json_response(response: &ReportResponse<'_>) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, response)
        .context("failed to serialize report json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

fn write_text_response(response: &ReportResponse<'_>, limit: usize) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(output, "File: {}", response.file)?;
    writeln!(
        output,
        "Rows: {} (skipped {}) score={} issues={} rows_with_issues={}",
        response.total_rows,
        response.skipped_lines.len(),
        response.score,
        response.issue_count,
        response.rows_with_issues,
    )?;

    let tally = response
        .issues_by_kind
        .iter()
        .map(|(kind, count)| format!("{kind}={count}"))
        .collect::<Vec<String>>()
        .join(" ");
    writeln!(output, "By kind: {tally}")?;

    if !response.skipped_lines.is_empty() {
        let skipped = response
            .skipped_lines
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<String>>()
            .join(", ");
        writeln!(output, "Short rows dropped at file lines: {skipped}")?;
    }

    for issue in response.issues.iter().take(limit) {
        writeln!(
            output,
            "line {}\t{}\t{}\t{}",
            issue.line, issue.kind, issue.field, issue.message
        )?;
    }

    if response.issues.len() > limit {
        writeln!(output, "... {} more", response.issues.len() - limit)?;
    }

    output.flush()?;
    Ok(())
}
