pub mod ingest;
pub mod report;
pub mod view;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use annotab::{FileRecord, ParseOptions, UploadRequest};

pub(crate) fn read_upload(
    path: &Path,
    uploader: &str,
    description: &str,
    tags: &str,
) -> Result<UploadRequest> {
    let content = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(ToOwned::to_owned)
        .with_context(|| format!("invalid UTF-8 filename: {}", path.display()))?;

    Ok(UploadRequest {
        file_name,
        content,
        uploader: uploader.to_string(),
        description: description.to_string(),
        tags: tags.to_string(),
    })
}

pub(crate) fn load_record(path: &Path, options: &ParseOptions) -> Result<FileRecord> {
    let request = read_upload(path, "", "", "")?;
    annotab::ingest(&request, options, Utc::now())
        .with_context(|| format!("failed to ingest {}", path.display()))
}
