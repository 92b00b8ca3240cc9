//! Collection query descriptors.
//!
//! A descriptor is the full description of a collection lookup: sort field,
//! direction, page and resource-specific filters. It is immutable once built
//! and is the input to the cache fingerprint, so two descriptors with equal
//! fields always address the same cache entry.

use std::num::NonZeroU32;

use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_PAGE_NUMBER: NonZeroU32 = NonZeroU32::MIN;
pub const DEFAULT_PAGE_SIZE: NonZeroU32 = match NonZeroU32::new(20) {
    Some(size) => size,
    None => NonZeroU32::MIN,
};
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("`{field}` must be a positive integer")]
    NotPositive { field: &'static str },
}

/// Descriptor with no resource-specific filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct NoFilters {}

pub type FilterQuery = QueryDescriptor<NoFilters>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor<F> {
    sort_by: Option<String>,
    is_descending: bool,
    page_number: NonZeroU32,
    page_size: NonZeroU32,
    filters: F,
}

impl<F: Default> Default for QueryDescriptor<F> {
    fn default() -> Self {
        Self::new(F::default())
    }
}

impl<F> QueryDescriptor<F> {
    pub fn new(filters: F) -> Self {
        Self {
            sort_by: None,
            is_descending: false,
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
            filters,
        }
    }

    /// Blank sort fields are treated as absent.
    pub fn sort_by(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        let field = field.trim();
        self.sort_by = (!field.is_empty()).then(|| field.to_string());
        self
    }

    pub fn descending(mut self, is_descending: bool) -> Self {
        self.is_descending = is_descending;
        self
    }

    pub fn page(mut self, number: u32) -> Result<Self, QueryError> {
        self.page_number = NonZeroU32::new(number).ok_or(QueryError::NotPositive {
            field: "pageNumber",
        })?;
        Ok(self)
    }

    /// Sizes above [`MAX_PAGE_SIZE`] are clamped.
    pub fn page_size(mut self, size: u32) -> Result<Self, QueryError> {
        let size = NonZeroU32::new(size.min(MAX_PAGE_SIZE)).ok_or(QueryError::NotPositive {
            field: "pageSize",
        })?;
        self.page_size = size;
        Ok(self)
    }

    pub fn sort_field(&self) -> Option<&str> {
        self.sort_by.as_deref()
    }

    pub fn is_descending(&self) -> bool {
        self.is_descending
    }

    pub fn page_number(&self) -> u32 {
        self.page_number.get()
    }

    pub fn limit(&self) -> u32 {
        self.page_size.get()
    }

    /// Rows skipped before the requested page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page_number.get() - 1) * u64::from(self.page_size.get())
    }

    pub fn filters(&self) -> &F {
        &self.filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Fingerprint;

    #[test]
    fn defaults_match_first_page() {
        let query = FilterQuery::default();
        assert_eq!(query.sort_field(), None);
        assert!(!query.is_descending());
        assert_eq!(query.page_number(), 1);
        assert_eq!(query.limit(), 20);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn offset_skips_previous_pages() {
        let query = FilterQuery::default()
            .page(3)
            .and_then(|query| query.page_size(25))
            .unwrap();
        assert_eq!(query.offset(), 50);
    }

    #[test]
    fn zero_page_values_are_rejected() {
        assert_eq!(
            FilterQuery::default().page(0),
            Err(QueryError::NotPositive {
                field: "pageNumber"
            })
        );
        assert_eq!(
            FilterQuery::default().page_size(0),
            Err(QueryError::NotPositive { field: "pageSize" })
        );
    }

    #[test]
    fn page_size_is_clamped() {
        let query = FilterQuery::default().page_size(10_000).unwrap();
        assert_eq!(query.limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn blank_sort_is_absent() {
        assert_eq!(FilterQuery::default().sort_by("  "), FilterQuery::default());
    }

    #[test]
    fn serialized_shape_nests_filters() {
        let value = serde_json::to_value(FilterQuery::default()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "sortBy": null,
                "isDescending": false,
                "pageNumber": 1,
                "pageSize": 20,
                "filters": {}
            })
        );
    }

    #[test]
    fn construction_order_does_not_change_fingerprint() {
        let first = FilterQuery::default()
            .sort_by("number")
            .descending(true)
            .page(2)
            .unwrap();
        let second = FilterQuery::default()
            .page(2)
            .unwrap()
            .descending(true)
            .sort_by("number");

        assert_eq!(first, second);
        assert_eq!(
            Fingerprint::of(&first).unwrap(),
            Fingerprint::of(&second).unwrap()
        );
    }
}
