use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::model::{Row, RowField};

mod sort;
mod view_state;


pub use sort::locale_compare;
pub use view_state::{DEFAULT_PAGE_SIZE, SortDirection, SortState, ViewState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryPage<'a> {
    pub rows: Vec<&'a Row>,
    pub filtered_total: usize,
    pub page: usize,
    pub page_size: usize,
    pub page_count: usize,
}

/// Search, filter, sort and slice `rows` for one page of the table.
/// `rows` is only read; the page borrows from it.
pub fn query<'a>(rows: &'a [Row], view: &ViewState) -> QueryPage<'a> {
    let needle = view.search().to_lowercase();

    let mut matched = rows
        .iter()
        .filter(|row| needle.is_empty() || matches_search(row, &needle))
        .filter(|row| matches_exact(&row.project_id, view.project_filter()))
        .filter(|row| matches_exact(&row.source, view.source_filter()))
        .collect::<Vec<&Row>>();

    sort::sort_rows(&mut matched, view.sort());

    let filtered_total = matched.len();
    let page_size = view.page_size().max(1);
    let start = view.page().saturating_sub(1).saturating_mul(page_size);
    let page_rows = matched
        .into_iter()
        .skip(start)
        .take(page_size)
        .collect::<Vec<&Row>>();

    debug!(
        total = rows.len(),
        filtered = filtered_total,
        page = view.page(),
        returned = page_rows.len(),
        "queried rows"
    );

    QueryPage {
        rows: page_rows,
        filtered_total,
        page: view.page(),
        page_size,
        page_count: page_count(filtered_total, page_size),
    }
}

/// Number of pages needed for `total` rows; never less than one.
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// Distinct non-empty values of `field`, in first-seen order, for filter
/// pickers.
pub fn filter_options(rows: &[Row], field: RowField) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .map(|row| row.get(field))
        .filter(|value| !value.is_empty() && seen.insert(*value))
        .map(ToOwned::to_owned)
        .collect()
}

fn matches_search(row: &Row, needle: &str) -> bool {
    row.question.to_lowercase().contains(needle) || row.output.to_lowercase().contains(needle)
}

fn matches_exact(value: &str, filter: Option<&str>) -> bool {
    filter.is_none_or(|expected| value == expected)
}
