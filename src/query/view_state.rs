use std::str::FromStr;

use serde::Serialize;

use crate::error::ViewStateError;
use crate::model::RowField;

pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl FromStr for SortDirection {
    type Err = ViewStateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            _ => Err(ViewStateError::UnknownSortDirection(value.to_string())),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(tag = "direction", content = "field", rename_all = "snake_case")]
pub enum SortState {
    #[default]
    None,
    Ascending(RowField),
    Descending(RowField),
}

impl SortState {
    /// Builds a sort from loosely typed names. A missing field or a `none`
    /// direction means unsorted; a field without a direction sorts ascending.
    pub fn from_parts(field: Option<&str>, direction: Option<&str>) -> Result<Self, ViewStateError> {
        let Some(field) = field else {
            return Ok(Self::None);
        };
        let field = field.parse::<RowField>()?;

        match direction.map(str::trim) {
            None => Ok(Self::Ascending(field)),
            Some(value) if value.eq_ignore_ascii_case("none") => Ok(Self::None),
            Some(value) => Ok(match value.parse::<SortDirection>()? {
                SortDirection::Ascending => Self::Ascending(field),
                SortDirection::Descending => Self::Descending(field),
            }),
        }
    }

    /// none -> ascending -> descending -> none on the same field; switching
    /// fields always starts at ascending.
    pub fn toggle(self, field: RowField) -> Self {
        match self {
            Self::Ascending(current) if current == field => Self::Descending(field),
            Self::Descending(current) if current == field => Self::None,
            _ => Self::Ascending(field),
        }
    }

    pub fn field(self) -> Option<RowField> {
        match self {
            Self::None => None,
            Self::Ascending(field) | Self::Descending(field) => Some(field),
        }
    }

    pub fn direction(self) -> Option<SortDirection> {
        match self {
            Self::None => None,
            Self::Ascending(_) => Some(SortDirection::Ascending),
            Self::Descending(_) => Some(SortDirection::Descending),
        }
    }
}

/// Search, filter, sort and paging parameters for one table view.
///
/// Values are immutable; every change produces a new view. Changing the
/// search text, a filter or the sort puts the view back on page 1.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ViewState {
    search: String,
    project_filter: Option<String>,
    source_filter: Option<String>,
    sort: SortState,
    page: usize,
    page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search: String::new(),
            project_filter: None,
            source_filter: None,
            sort: SortState::None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self.page = 1;
        self
    }

    /// `None` or an empty value means every project.
    pub fn with_project_filter(mut self, project_id: Option<String>) -> Self {
        self.project_filter = project_id.filter(|value| !value.is_empty());
        self.page = 1;
        self
    }

    pub fn with_source_filter(mut self, source: Option<String>) -> Self {
        self.source_filter = source.filter(|value| !value.is_empty());
        self.page = 1;
        self
    }

    pub fn with_sort(mut self, sort: SortState) -> Self {
        self.sort = sort;
        self.page = 1;
        self
    }

    pub fn with_page(mut self, page: usize) -> Result<Self, ViewStateError> {
        if page == 0 {
            return Err(ViewStateError::ZeroPage);
        }
        self.page = page;
        Ok(self)
    }

    pub fn with_page_size(mut self, page_size: usize) -> Result<Self, ViewStateError> {
        if page_size == 0 {
            return Err(ViewStateError::ZeroPageSize);
        }
        self.page_size = page_size;
        self.page = 1;
        Ok(self)
    }

    pub fn toggle_sort(&self, field: RowField) -> Self {
        Self {
            sort: self.sort.toggle(field),
            page: 1,
            ..self.clone()
        }
    }

    /// Keeps the page inside `[1, page_count(filtered_total)]`.
    pub fn clamp_page(&self, filtered_total: usize) -> Self {
        let last_page = super::page_count(filtered_total, self.page_size);
        Self {
            page: self.page.clamp(1, last_page),
            ..self.clone()
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn project_filter(&self) -> Option<&str> {
        self.project_filter.as_deref()
    }

    pub fn source_filter(&self) -> Option<&str> {
        self.source_filter.as_deref()
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}
