use std::borrow::Cow;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::IngestError;
use crate::model::{FileRecord, FileStatus};
use crate::parser::{ParseOptions, parse_with_options};
use crate::quality::{analyze, count_rows_with_problems};
use crate::util::{sha256_hex, utc_compact_string};

pub const DEFAULT_UPLOADER: &str = "Anonymous";

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub content: Vec<u8>,
    pub uploader: String,
    pub description: String,
    /// Comma-separated, as typed by the uploader.
    pub tags: String,
}

pub fn ingest(
    request: &UploadRequest,
    options: &ParseOptions,
    uploaded_at: DateTime<Utc>,
) -> Result<FileRecord, IngestError> {
    if !request.file_name.ends_with(".csv") {
        warn!(file = %request.file_name, "rejected non-csv upload");
        return Err(IngestError::NotCsv(request.file_name.clone()));
    }

    let text = String::from_utf8_lossy(&request.content);
    if let Cow::Owned(_) = text {
        warn!(file = %request.file_name, "replaced invalid utf-8 sequences");
    }

    let parsed = parse_with_options(&text, options).inspect_err(|err| {
        warn!(file = %request.file_name, error = %err, "rejected upload");
    })?;

    let report = analyze(&parsed.rows);
    let rows_with_issues = count_rows_with_problems(&parsed.rows);
    let content_sha256 = sha256_hex(&request.content);
    let id = format!(
        "file-{}-{}",
        utc_compact_string(uploaded_at),
        &content_sha256[..8]
    );

    info!(
        id = %id,
        file = %request.file_name,
        rows = parsed.rows.len(),
        skipped_rows = parsed.skipped_lines.len(),
        issues = report.issue_count(),
        rows_with_issues,
        score = report.score,
        "ingested file"
    );

    Ok(FileRecord {
        id,
        name: request.file_name.clone(),
        size_bytes: request.content.len(),
        uploaded_at,
        uploader: normalize_uploader(&request.uploader),
        description: normalize_description(&request.description),
        tags: parse_tags(&request.tags),
        content_sha256,
        status: FileStatus::Ready,
        quality_issue_count: report.issue_count(),
        rows_with_issues,
        rows: parsed.rows,
    })
}

/// Splits on commas, trims, drops empties. `None` when nothing is left.
pub fn parse_tags(raw: &str) -> Option<Vec<String>> {
    let tags = raw
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToOwned::to_owned)
        .collect::<Vec<String>>();

    if tags.is_empty() { None } else { Some(tags) }
}

fn normalize_description(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn normalize_uploader(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DEFAULT_UPLOADER.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Ingested files for one session, newest first.
#[derive(Debug, Default)]
pub struct FileLibrary {
    records: Vec<FileRecord>,
}

impl FileLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `record` as the newest entry. An id already held by another
    /// record gets the first free `-N` suffix, so every entry stays reachable.
    pub fn add(&mut self, mut record: FileRecord) -> &FileRecord {
        if self.get(&record.id).is_some() {
            let base = record.id.clone();
            let mut suffix = 2;
            while self.get(&format!("{base}-{suffix}")).is_some() {
                suffix += 1;
            }
            record.id = format!("{base}-{suffix}");
            debug!(base = %base, id = %record.id, "renamed duplicate file id");
        }
        self.records.insert(0, record);
        &self.records[0]
    }

    pub fn get(&self, id: &str) -> Option<&FileRecord> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn remove(&mut self, id: &str) -> Option<FileRecord> {
        let index = self.records.iter().position(|record| record.id() == id)?;
        let removed = self.records.remove(index);
        info!(id = %removed.id(), file = %removed.name(), "removed file");
        Some(removed)
    }

    pub fn list(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_rows(&self) -> usize {
        self.records.iter().map(FileRecord::row_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::error::ParseError;

    const CSV: &str = "proj_id,question,output,updated,source\n\
        P1,What is the staking yield?,About four percent,2024-01-15,docs\n\
        P2,?,,not a date,\n\
        P3,short,row\n";

    fn upload(file_name: &str, content: &str) -> UploadRequest {
        UploadRequest {
            file_name: file_name.to_string(),
            content: content.as_bytes().to_vec(),
            uploader: "  dana ".to_string(),
            description: "  weekly export ".to_string(),
            tags: "solana, , staking ,".to_string(),
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn ingest_builds_ready_record_with_cached_counts() {
        let record = ingest(&upload("batch.csv", CSV), &ParseOptions::default(), at(9)).unwrap();

        assert_eq!(record.status(), FileStatus::Ready);
        assert_eq!(record.name(), "batch.csv");
        assert_eq!(record.size_bytes(), CSV.len());
        assert_eq!(record.row_count(), 2);
        assert_eq!(record.uploader(), "dana");
        assert_eq!(record.description(), Some("weekly export"));
        assert_eq!(
            record.tags(),
            Some(&["solana".to_string(), "staking".to_string()][..])
        );
        // empty output + empty source, invalid date, two short-question, missing output
        assert_eq!(record.quality_issue_count(), 6);
        assert_eq!(record.rows_with_issues(), 1);
        assert_eq!(record.uploaded_at(), at(9));
        assert!(record.id().starts_with("file-20240501T090000Z-"));
        assert_eq!(record.content_sha256().len(), 64);
    }

    #[test]
    fn ingest_rejects_non_csv_names() {
        let err = ingest(&upload("batch.txt", CSV), &ParseOptions::default(), at(9)).unwrap_err();
        assert!(matches!(err, IngestError::NotCsv(name) if name == "batch.txt"));

        let upper = ingest(&upload("batch.CSV", CSV), &ParseOptions::default(), at(9));
        assert!(matches!(upper, Err(IngestError::NotCsv(_))));
    }

    #[test]
    fn ingest_surfaces_malformed_input_without_a_record() {
        let err = ingest(
            &upload("empty.csv", "proj_id,question,output,updated,source\n"),
            &ParseOptions::default(),
            at(9),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            IngestError::Parse(ParseError::MalformedInput { usable_lines: 1 })
        ));
    }

    #[test]
    fn ingest_replaces_invalid_utf8() {
        let mut request = upload("bytes.csv", "");
        request.content = b"proj_id,question,output,updated,source\nP\xff1,Q,O,2024-01-01,S\n".to_vec();

        let record = ingest(&request, &ParseOptions::default(), at(9)).unwrap();
        assert_eq!(record.rows()[0].project_id, "P\u{fffd}1");
    }

    #[test]
    fn blank_metadata_falls_back_to_defaults() {
        let mut request = upload("batch.csv", CSV);
        request.uploader = "   ".to_string();
        request.description = String::new();
        request.tags = " , ".to_string();

        let record = ingest(&request, &ParseOptions::default(), at(9)).unwrap();
        assert_eq!(record.uploader(), DEFAULT_UPLOADER);
        assert_eq!(record.description(), None);
        assert_eq!(record.tags(), None);
    }

    #[test]
    fn parse_tags_trims_and_drops_empties() {
        assert_eq!(
            parse_tags("a, b ,,c"),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
        assert_eq!(parse_tags(""), None);
    }

    #[test]
    fn library_lists_newest_first_and_removes_by_id() {
        let mut library = FileLibrary::new();
        let first = ingest(&upload("first.csv", CSV), &ParseOptions::default(), at(9)).unwrap();
        let second = ingest(&upload("second.csv", CSV), &ParseOptions::default(), at(10)).unwrap();
        let first_id = first.id().to_string();

        library.add(first);
        library.add(second);

        assert_eq!(library.len(), 2);
        assert_eq!(library.total_rows(), 4);
        assert_eq!(library.list()[0].name(), "second.csv");
        assert_eq!(library.get(&first_id).map(FileRecord::name), Some("first.csv"));

        let removed = library.remove(&first_id).unwrap();
        assert_eq!(removed.name(), "first.csv");
        assert!(library.get(&first_id).is_none());
        assert!(library.remove(&first_id).is_none());
        assert_eq!(library.len(), 1);
        assert!(!library.is_empty());
    }

    #[test]
    fn identical_uploads_at_the_same_instant_stay_addressable() {
        let mut alice = upload("batch.csv", CSV);
        alice.uploader = "alice".to_string();
        let mut bob = alice.clone();
        bob.uploader = "bob".to_string();
        let carol = UploadRequest {
            uploader: "carol".to_string(),
            ..alice.clone()
        };

        let mut library = FileLibrary::new();
        let alice_id = library
            .add(ingest(&alice, &ParseOptions::default(), at(9)).unwrap())
            .id()
            .to_string();
        let bob_id = library
            .add(ingest(&bob, &ParseOptions::default(), at(9)).unwrap())
            .id()
            .to_string();
        let carol_id = library
            .add(ingest(&carol, &ParseOptions::default(), at(9)).unwrap())
            .id()
            .to_string();

        assert_ne!(alice_id, bob_id);
        assert_eq!(bob_id, format!("{alice_id}-2"));
        assert_eq!(carol_id, format!("{alice_id}-3"));
        assert_eq!(library.get(&alice_id).map(FileRecord::uploader), Some("alice"));
        assert_eq!(library.get(&bob_id).map(FileRecord::uploader), Some("bob"));

        let removed = library.remove(&alice_id).unwrap();
        assert_eq!(removed.uploader(), "alice");
        assert_eq!(library.get(&carol_id).map(FileRecord::uploader), Some("carol"));
        assert_eq!(library.len(), 2);
    }
}
