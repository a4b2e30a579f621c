use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use annotab::{
    ParseOptions, QueryPage, RowField, SortState, ViewState, filter_options, query,
};

use crate::cli::ViewArgs;
use crate::commands::load_record;

#[derive(Debug, Serialize)]
struct ViewResponse<'a> {
    file: String,
    view: &'a ViewState,
    project_options: Vec<String>,
    source_options: Vec<String>,
    #[serde(flatten)]
    page: QueryPage<'a>,
}

pub fn run(args: ViewArgs) -> Result<()> {
    let sort = SortState::from_parts(
        args.sort_field.as_deref(),
        args.sort_direction.map(|direction| direction.as_str()),
    )
    .context("invalid sort arguments")?;

    let view = ViewState::new()
        .with_search(args.search.clone())
        .with_project_filter(args.project.clone())
        .with_source_filter(args.source.clone())
        .with_sort(sort)
        .with_page_size(args.page_size)
        .context("invalid page size")?
        .with_page(args.page)
        .context("invalid page")?;

    let record = load_record(&args.file, &ParseOptions::default())?;
    let page = query(record.rows(), &view);

    if view.clamp_page(page.filtered_total).page() != view.page() {
        warn!(
            page = view.page(),
            page_count = page.page_count,
            "requested page is past the last page"
        );
    }

    info!(
        file = %record.name(),
        filtered = page.filtered_total,
        returned = page.rows.len(),
        page = page.page,
        page_count = page.page_count,
        "view rendered"
    );

    let response = ViewResponse {
        file: args.file.display().to_string(),
        view: &view,
        project_options: filter_options(record.rows(), RowField::ProjectId),
        source_options: filter_options(record.rows(), RowField::Source),
        page,
    };

    if args.json {
        write_json_response(&response)
    } else {
        write_text_response(&response)
    }
}

fn write_json_response(response: &ViewResponse<'_>) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, response)
        .context("failed to serialize view json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

fn write_text_response(response: &ViewResponse<'_>) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    let page = &response.page;

    writeln!(output, "File: {}", response.file)?;
    writeln!(
        output,
        "Showing {} of {} matching rows (page {}/{}, {} per page)",
        page.rows.len(),
        page.filtered_total,
        page.page,
        page.page_count,
        page.page_size,
    )?;

    let header = RowField::ALL
        .iter()
        .map(|field| field.column_name())
        .collect::<Vec<&str>>()
        .join("\t");
    writeln!(output, "{header}")?;

    for row in &page.rows {
        let cells = RowField::ALL
            .iter()
            .map(|field| row.get(*field))
            .collect::<Vec<&str>>()
            .join("\t");
        writeln!(output, "{cells}")?;
    }

    output.flush()?;
    Ok(())
}
