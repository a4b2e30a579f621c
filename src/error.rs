use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty or malformed input: expected a header and at least one data line, found {usable_lines} usable line(s)")]
    MalformedInput { usable_lines: usize },
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("file must end with .csv: {0}")]
    NotCsv(String),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ViewStateError {
    #[error("unknown sort field: {0}")]
    UnknownSortField(String),

    #[error("unknown sort direction: {0}")]
    UnknownSortDirection(String),

    #[error("page size must be at least 1")]
    ZeroPageSize,

    #[error("page numbers start at 1")]
    ZeroPage,
}
