//! Untrusted sort and paging parameters.
//!
//! [`Filters`] is what a caller decodes from a request. It can only be turned
//! into a [`ValidatedFilters`] through [`validate_filters`] (or
//! [`Filters::validate`]), and list queries accept nothing else. That keeps the
//! ORDER BY column restricted to safelist entries: the column is taken from the
//! matched safelist entry, never from the raw request value.

use std::fmt;

use crate::validation::{ValidationErrors, Validator};

pub const MAX_PAGE: i64 = 10_000_000;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone)]
pub struct Filters {
    /// Requested sort key, optionally prefixed with `-` for descending order.
    pub sort: String,
    /// Trusted sort keys. Defined by the calling code, never by the request.
    pub sort_safelist: &'static [&'static str],
    pub page: i64,
    pub page_size: i64,
}

impl Filters {
    pub fn new(
        sort: impl Into<String>,
        sort_safelist: &'static [&'static str],
        page: i64,
        page_size: i64,
    ) -> Self {
        Self {
            sort: sort.into(),
            sort_safelist,
            page,
            page_size,
        }
    }

    /// Validate on a fresh [`Validator`].
    pub fn validate(&self) -> Result<ValidatedFilters, ValidationErrors> {
        let mut v = Validator::new();
        let resolved = validate_filters(&mut v, self);
        v.into_result()?;
        // `validate_filters` only withholds a value when it recorded an error.
        resolved.ok_or_else(ValidationErrors::default)
    }
}

/// Check `filters` into `v` and resolve them when they pass.
///
/// Errors are recorded under `page`, `page_size` and `sort`. `None` is
/// returned whenever any of those fields failed, so other fields can still be
/// validated on the same `v` before the caller reports.
pub fn validate_filters(
    v: &mut Validator,
    filters: &Filters,
) -> Option<ValidatedFilters> {
    let mut ok = true;
    let mut check = |cond: bool, field: &str, message: &str| {
        v.check(cond, field, message);
        ok &= cond;
    };

    check(filters.page >= 1, "page", "must be greater than zero");
    check(
        filters.page <= MAX_PAGE,
        "page",
        "must be a maximum of 10 million",
    );
    check(filters.page_size >= 1, "page_size", "must be greater than zero");
    check(
        filters.page_size <= MAX_PAGE_SIZE,
        "page_size",
        "must be a maximum of 100",
    );

    let matched = filters
        .sort_safelist
        .iter()
        .copied()
        .find(|entry| *entry == filters.sort);
    check(matched.is_some(), "sort", "invalid sort value");

    let entry = matched?;
    ok.then(|| ValidatedFilters::resolve(entry, filters.page, filters.page_size))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Sort and paging parameters that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedFilters {
    sort_column: &'static str,
    sort_order: SortOrder,
    page: i64,
    page_size: i64,
}

impl ValidatedFilters {
    fn resolve(safelist_entry: &'static str, page: i64, page_size: i64) -> Self {
        let (sort_column, sort_order) = match safelist_entry.strip_prefix('-') {
            Some(column) => (column, SortOrder::Descending),
            None => (safelist_entry, SortOrder::Ascending),
        };

        Self {
            sort_column,
            sort_order,
            page,
            page_size,
        }
    }

    /// Column to order by, taken from the safelist entry.
    pub fn sort_column(&self) -> &'static str {
        self.sort_column
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAFELIST: &[&str] = &["id", "title", "year", "-id", "-title", "-year"];

    #[test]
    fn resolves_ascending_column() {
        let resolved = Filters::new("title", SAFELIST, 1, 20).validate().unwrap();
        assert_eq!(resolved.sort_column(), "title");
        assert_eq!(resolved.sort_order(), SortOrder::Ascending);
        assert_eq!(resolved.limit(), 20);
        assert_eq!(resolved.offset(), 0);
    }

    #[test]
    fn resolves_descending_column_and_offset() {
        let resolved = Filters::new("-year", SAFELIST, 3, 25).validate().unwrap();
        assert_eq!(resolved.sort_column(), "year");
        assert_eq!(resolved.sort_order().as_sql(), "DESC");
        assert_eq!(resolved.offset(), 50);
        assert_eq!(resolved.limit(), 25);
    }

    #[test]
    fn rejects_sort_outside_safelist() {
        for sort in ["runtime", "title; DROP TABLE movies", "--id", "-", ""] {
            let errors = Filters::new(sort, SAFELIST, 1, 20).validate().unwrap_err();
            assert_eq!(errors.get("sort"), Some("invalid sort value"), "{sort:?}");
        }
    }

    #[test]
    fn bad_sort_is_reported_alongside_paging_errors() {
        let errors = Filters::new("name", SAFELIST, 0, 20).validate().unwrap_err();
        assert_eq!(errors.get("sort"), Some("invalid sort value"));
        assert_eq!(errors.get("page"), Some("must be greater than zero"));
    }

    #[test]
    fn page_bounds() {
        let errors = Filters::new("id", SAFELIST, 0, 0).validate().unwrap_err();
        assert_eq!(errors.get("page"), Some("must be greater than zero"));
        assert_eq!(errors.get("page_size"), Some("must be greater than zero"));

        let errors = Filters::new("id", SAFELIST, MAX_PAGE + 1, MAX_PAGE_SIZE + 1)
            .validate()
            .unwrap_err();
        assert_eq!(errors.get("page"), Some("must be a maximum of 10 million"));
        assert_eq!(errors.get("page_size"), Some("must be a maximum of 100"));

        assert!(Filters::new("id", SAFELIST, MAX_PAGE, MAX_PAGE_SIZE).validate().is_ok());
    }

    #[test]
    fn shares_a_validator_with_other_fields() {
        let mut v = Validator::new();
        v.check(false, "title", "must be provided");
        let resolved = validate_filters(&mut v, &Filters::new("-id", SAFELIST, 1, 5));

        assert!(resolved.is_some());
        let errors = v.into_result().unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["title"]);
    }

    #[test]
    fn withholds_resolution_when_only_paging_fails() {
        let mut v = Validator::new();
        let resolved = validate_filters(&mut v, &Filters::new("id", SAFELIST, 0, 5));
        assert!(resolved.is_none());
        assert!(v.has_error("page"));
    }
}
