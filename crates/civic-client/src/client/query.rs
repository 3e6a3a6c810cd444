// Filter and pagination state for one complaints list.
use crate::api::{Complaint, ListRequest, ListResponse};

/// Free-text filters. Empty strings mean "no filter on this field".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilters {
    pub name: String,
    pub date: String,
}

impl ListFilters {
    pub fn new(name: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            date: date.into(),
        }
    }

    /// Filters that match every complaint.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.date.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub filters: ListFilters,
    /// 1-based page index.
    pub page: u32,
    pub page_size: u32,
    pub status: String,
}

impl ListQuery {
    pub fn new(status: impl Into<String>, page_size: u32) -> Self {
        Self {
            filters: ListFilters::all(),
            page: 1,
            page_size: page_size.max(1),
            status: status.into(),
        }
    }

    pub fn skip(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }

    /// Install new filters; a new filter always starts from page 1.
    pub fn apply_filters(&mut self, filters: ListFilters) {
        self.filters = filters;
        self.page = 1;
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Switch the status tab; like a filter change this resets to page 1.
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.page = 1;
    }

    pub fn page_count(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.page_size))
    }

    pub fn to_request(&self) -> ListRequest {
        ListRequest {
            name: self.filters.name.clone(),
            date: self.filters.date.clone(),
            status: self.status.clone(),
            skip: self.skip(),
            limit: self.limit(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListResult {
    pub items: Vec<Complaint>,
    pub total_count: u64,
    pub total_for_status: u64,
}

impl From<ListResponse> for ListResult {
    fn from(response: ListResponse) -> Self {
        Self {
            items: response.data,
            total_count: response.total,
            total_for_status: response.total_waiting,
        }
    }
}
