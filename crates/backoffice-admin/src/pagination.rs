//! Pagination of collections.
//!
//! Pages are 1-indexed. Request values that are missing, non-numeric or
//! zero fall back to page 1 and the configured page size. A page past the
//! end is empty rather than clamped to the last page.

use serde::{Deserialize, Serialize};

/// A requested page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// The 1-indexed page number.
    pub page: usize,
    /// Items per page, always at least 1.
    pub per_page: usize,
}

impl Pagination {
    /// Creates a pagination, clamping both values to at least 1.
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Reads `_page` and `per_page` request values.
    ///
    /// ```
    /// use backoffice_admin::pagination::Pagination;
    ///
    /// assert_eq!(Pagination::from_params(None, None, 20), Pagination::new(1, 20));
    /// assert_eq!(Pagination::from_params(Some("3"), Some("5"), 20), Pagination::new(3, 5));
    /// assert_eq!(Pagination::from_params(Some("x"), Some("0"), 20), Pagination::new(1, 20));
    /// ```
    pub fn from_params(page: Option<&str>, per_page: Option<&str>, default_per_page: usize) -> Self {
        let parse = |raw: Option<&str>| {
            raw.and_then(|s| s.trim().parse::<usize>().ok())
                .filter(|n| *n > 0)
        };
        Self::new(
            parse(page).unwrap_or(1),
            parse(per_page).unwrap_or(default_per_page),
        )
    }

    /// The index of the first item on this page.
    pub const fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }
}

/// One page of a collection plus its paging metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Matching items across all pages.
    pub total_count: usize,
    /// The 1-indexed page number.
    pub page: usize,
    /// Items per page.
    pub per_page: usize,
    /// Number of pages (at least 1).
    pub total_pages: usize,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_previous: bool,
}

impl<T> Paginated<T> {
    /// Slices `all` to the requested page.
    pub fn paginate(all: Vec<T>, pagination: Pagination) -> Self {
        let pagination = Pagination::new(pagination.page, pagination.per_page);
        let total_count = all.len();
        let total_pages = total_count.div_ceil(pagination.per_page).max(1);
        let items: Vec<T> = all
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.per_page)
            .collect();
        Self {
            items,
            total_count,
            page: pagination.page,
            per_page: pagination.per_page,
            total_pages,
            has_next: pagination.page < total_pages,
            has_previous: pagination.page > 1,
        }
    }

    /// Puts every item on a single page.
    pub fn single_page(all: Vec<T>) -> Self {
        let total_count = all.len();
        Self {
            items: all,
            total_count,
            page: 1,
            per_page: total_count.max(1),
            total_pages: 1,
            has_next: false,
            has_previous: false,
        }
    }

    /// Transforms the items, keeping the metadata.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_middle_page() {
        let p = Paginated::paginate((1..=45).collect(), Pagination::new(2, 20));
        assert_eq!(p.items.first(), Some(&21));
        assert_eq!(p.items.len(), 20);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next);
        assert!(p.has_previous);
    }

    #[test]
    fn test_paginate_last_partial_page() {
        let p = Paginated::paginate((1..=45).collect(), Pagination::new(3, 20));
        assert_eq!(p.items, (41..=45).collect::<Vec<_>>());
        assert!(!p.has_next);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let p = Paginated::paginate(vec![1, 2, 3], Pagination::new(9, 2));
        assert!(p.items.is_empty());
        assert_eq!(p.page, 9);
        assert_eq!(p.total_pages, 2);
        assert!(!p.has_next);
    }

    #[test]
    fn test_empty_collection() {
        let p: Paginated<u8> = Paginated::paginate(Vec::new(), Pagination::new(1, 20));
        assert_eq!(p.total_pages, 1);
        assert!(!p.has_next && !p.has_previous);
    }

    #[test]
    fn test_single_page_and_map() {
        let p = Paginated::single_page(vec![1, 2, 3]).map(|n| n * 10);
        assert_eq!(p.items, vec![10, 20, 30]);
        assert_eq!(p.per_page, 3);
    }

    #[test]
    fn test_from_params_trims() {
        assert_eq!(
            Pagination::from_params(Some(" 2 "), Some("-1"), 20),
            Pagination::new(2, 20)
        );
    }
}
