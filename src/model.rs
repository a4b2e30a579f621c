use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ViewStateError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub project_id: String,
    pub question: String,
    pub output: String,
    pub updated_at: String,
    pub source: String,
}

impl Row {
    pub fn get(&self, field: RowField) -> &str {
        match field {
            RowField::ProjectId => &self.project_id,
            RowField::Question => &self.question,
            RowField::Output => &self.output,
            RowField::UpdatedAt => &self.updated_at,
            RowField::Source => &self.source,
        }
    }
}

/// The five columns every row carries, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowField {
    ProjectId,
    Question,
    Output,
    UpdatedAt,
    Source,
}

impl RowField {
    pub const ALL: [RowField; 5] = [
        RowField::ProjectId,
        RowField::Question,
        RowField::Output,
        RowField::UpdatedAt,
        RowField::Source,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            Self::ProjectId => "proj_id",
            Self::Question => "question",
            Self::Output => "output",
            Self::UpdatedAt => "updated",
            Self::Source => "source",
        }
    }

    /// Index used when the header does not name this column.
    pub fn fallback_index(self) -> usize {
        match self {
            Self::ProjectId => 0,
            Self::Question => 1,
            Self::Output => 2,
            Self::UpdatedAt => 3,
            Self::Source => 4,
        }
    }
}

impl fmt::Display for RowField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for RowField {
    type Err = ViewStateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "proj_id" | "project_id" => Ok(Self::ProjectId),
            "question" => Ok(Self::Question),
            "output" => Ok(Self::Output),
            "updated" | "updated_at" => Ok(Self::UpdatedAt),
            "source" => Ok(Self::Source),
            _ => Err(ViewStateError::UnknownSortField(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    EmptyField,
    InvalidDate,
    ShortQuestion,
    MissingOutput,
    FlaggedOutput,
}

impl IssueKind {
    pub const ALL: [IssueKind; 5] = [
        IssueKind::EmptyField,
        IssueKind::InvalidDate,
        IssueKind::ShortQuestion,
        IssueKind::MissingOutput,
        IssueKind::FlaggedOutput,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmptyField => "empty-field",
            Self::InvalidDate => "invalid-date",
            Self::ShortQuestion => "short-question",
            Self::MissingOutput => "missing-output",
            Self::FlaggedOutput => "flagged-output",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub kind: IssueKind,
    pub message: String,
    pub line: usize,
    pub field: RowField,
}

/// Outcome of an upload. Records only ever carry `Ready`; a rejected upload
/// produces no record and is reported as `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Ready,
    Failed,
}

impl FileStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

/// An ingested dataset. Built once by [`crate::ingest::ingest`] and never
/// edited afterwards; the quality counts are cached at construction.
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) size_bytes: usize,
    pub(crate) uploaded_at: DateTime<Utc>,
    pub(crate) uploader: String,
    pub(crate) description: Option<String>,
    pub(crate) tags: Option<Vec<String>>,
    pub(crate) content_sha256: String,
    pub(crate) status: FileStatus,
    pub(crate) quality_issue_count: usize,
    pub(crate) rows_with_issues: usize,
    #[serde(skip)]
    pub(crate) rows: Vec<Row>,
}

impl FileRecord {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }

    pub fn uploader(&self) -> &str {
        &self.uploader
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn tags(&self) -> Option<&[String]> {
        self.tags.as_deref()
    }

    pub fn content_sha256(&self) -> &str {
        &self.content_sha256
    }

    pub fn status(&self) -> FileStatus {
        self.status
    }

    pub fn quality_issue_count(&self) -> usize {
        self.quality_issue_count
    }

    pub fn rows_with_issues(&self) -> usize {
        self.rows_with_issues
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
