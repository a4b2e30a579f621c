use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use annotab::quality::{analyze, quality_score};
use annotab::util::{now_utc_string, write_json_pretty};
use annotab::{FileRecord, FileStatus, IngestError, IssueKind, ParseOptions, ShortRowPolicy};

use crate::cli::IngestArgs;
use crate::commands::read_upload;

#[derive(Debug, Serialize)]
struct IngestManifest<'a> {
    manifest_version: u32,
    generated_at: String,
    file: String,
    status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<&'a FileRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    row_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<i64>,
    issues_by_kind: BTreeMap<IssueKind, usize>,
}

impl<'a> IngestManifest<'a> {
    fn new(file: &Path, outcome: &'a Result<FileRecord, IngestError>) -> Self {
        let base = Self {
            manifest_version: 1,
            generated_at: now_utc_string(),
            file: file.display().to_string(),
            status: FileStatus::Failed,
            record: None,
            error: None,
            row_count: 0,
            score: None,
            issues_by_kind: BTreeMap::new(),
        };

        match outcome {
            Ok(record) => Self {
                status: record.status(),
                record: Some(record),
                row_count: record.row_count(),
                score: Some(quality_score(
                    record.row_count(),
                    record.quality_issue_count(),
                )),
                issues_by_kind: analyze(record.rows()).counts_by_kind(),
                ..base
            },
            Err(err) => Self {
                error: Some(err.to_string()),
                ..base
            },
        }
    }
}

pub fn run(args: IngestArgs) -> Result<()> {
    let options = ParseOptions {
        short_row_policy: if args.warn_short_rows {
            ShortRowPolicy::Warn
        } else {
            ShortRowPolicy::Skip
        },
    };

    let request = read_upload(&args.file, &args.uploader, &args.description, &args.tags)?;
    let outcome = annotab::ingest(&request, &options, Utc::now());

    // A rejected upload still gets a manifest so callers can see why.
    if let Some(manifest_path) = &args.manifest_path {
        let manifest = IngestManifest::new(&args.file, &outcome);
        write_json_pretty(manifest_path, &manifest)?;
        info!(
            path = %manifest_path.display(),
            status = manifest.status.as_str(),
            "wrote ingest manifest"
        );
    }

    let record = outcome
        .inspect_err(|_| {
            warn!(
                file = %args.file.display(),
                status = FileStatus::Failed.as_str(),
                "ingest rejected"
            );
        })
        .with_context(|| format!("failed to ingest {}", args.file.display()))?;

    info!(
        id = %record.id(),
        status = record.status().as_str(),
        rows = record.row_count(),
        issues = record.quality_issue_count(),
        rows_with_issues = record.rows_with_issues(),
        score = quality_score(record.row_count(), record.quality_issue_count()),
        "ingest completed"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use annotab::UploadRequest;
    use chrono::TimeZone;

    use super::*;

    fn upload(file_name: &str, content: &str) -> UploadRequest {
        UploadRequest {
            file_name: file_name.to_string(),
            content: content.as_bytes().to_vec(),
            uploader: "ops".to_string(),
            description: String::new(),
            tags: String::new(),
        }
    }

    fn ingest(request: &UploadRequest) -> Result<FileRecord, IngestError> {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        annotab::ingest(request, &ParseOptions::default(), at)
    }

    #[test]
    fn accepted_upload_manifest_is_ready_with_counts() {
        let outcome = ingest(&upload(
            "batch.csv",
            "proj_id,question,output,updated,source\nP1,What is the staking yield?,Unsure?,2024-01-15,docs\n",
        ));
        let manifest = IngestManifest::new(Path::new("batch.csv"), &outcome);

        assert_eq!(manifest.status, FileStatus::Ready);
        assert!(manifest.record.is_some());
        assert!(manifest.error.is_none());
        assert_eq!(manifest.row_count, 1);
        assert_eq!(manifest.score, Some(0));
        assert_eq!(manifest.issues_by_kind[&IssueKind::FlaggedOutput], 1);
    }

    #[test]
    fn rejected_upload_manifest_is_failed_without_record() {
        let outcome = ingest(&upload("notes.txt", "anything"));
        let manifest = IngestManifest::new(Path::new("notes.txt"), &outcome);

        assert_eq!(manifest.status, FileStatus::Failed);
        assert!(manifest.record.is_none());
        assert!(manifest.error.as_deref().is_some_and(|error| error.contains("notes.txt")));
        assert_eq!(manifest.row_count, 0);
        assert_eq!(manifest.score, None);

        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["status"], "failed");
        assert!(json.get("record").is_none());
    }

    #[test]
    fn malformed_csv_manifest_is_failed() {
        let outcome = ingest(&upload("empty.csv", "proj_id,question,output,updated,source\n"));
        let manifest = IngestManifest::new(Path::new("empty.csv"), &outcome);

        assert_eq!(manifest.status, FileStatus::Failed);
        assert!(manifest.error.is_some());
    }
}
