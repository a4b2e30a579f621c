use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use annotab::query::DEFAULT_PAGE_SIZE;

#[derive(Parser, Debug)]
#[command(
    name = "annotab",
    version,
    about = "Inspect research-annotation CSV files: quality checks and table views"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Ingest(IngestArgs),
    Report(ReportArgs),
    View(ViewArgs),
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    #[arg(long)]
    pub file: PathBuf,

    #[arg(long, default_value = "")]
    pub uploader: String,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Comma-separated tags.
    #[arg(long, default_value = "")]
    pub tags: String,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub warn_short_rows: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    #[arg(long)]
    pub file: PathBuf,

    /// Maximum issues to print in text mode.
    #[arg(long, default_value_t = 50)]
    pub limit: usize,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum SortDirectionArg {
    Asc,
    Desc,
    #[value(name = "none")]
    Unsorted,
}

impl SortDirectionArg {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
            Self::Unsorted => "none",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    #[arg(long)]
    pub file: PathBuf,

    #[arg(long, default_value = "")]
    pub search: String,

    #[arg(long)]
    pub project: Option<String>,

    #[arg(long)]
    pub source: Option<String>,

    /// One of proj_id, question, output, updated, source.
    #[arg(long)]
    pub sort_field: Option<String>,

    #[arg(long, value_enum)]
    pub sort_direction: Option<SortDirectionArg>,

    #[arg(long, default_value_t = 1)]
    pub page: usize,

    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}
