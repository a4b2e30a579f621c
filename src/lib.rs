//! In-memory engine for research-annotation CSV uploads: parse the five-column
//! text, flag quality defects, and serve searchable, sortable, paged views.

pub mod dates;
pub mod error;
pub mod ingest;
pub mod model;
pub mod parser;
pub mod quality;
pub mod query;
pub mod util;

pub use error::{IngestError, ParseError, ViewStateError};
pub use ingest::{FileLibrary, UploadRequest, ingest};
pub use model::{FileRecord, FileStatus, IssueKind, QualityIssue, Row, RowField};
pub use parser::{ParseOptions, ParsedCsv, ShortRowPolicy, parse, parse_with_options};
pub use quality::{QualityReport, analyze, count_rows_with_problems, row_has_problem};
pub use query::{QueryPage, SortDirection, SortState, ViewState, filter_options, query};
