//! Safelisted sorting, pagination and listing results.

pub mod filters;
pub mod metadata;

pub use filters::{
    Filters, MAX_PAGE, MAX_PAGE_SIZE, SortOrder, ValidatedFilters,
    validate_filters,
};
pub use metadata::Metadata;

use serde::Serialize;

/// One page of a listing plus the metadata describing the whole result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub metadata: Metadata,
}

impl<T> Page<T> {
    pub fn new(records: Vec<T>, metadata: Metadata) -> Self {
        Self { records, metadata }
    }
}
