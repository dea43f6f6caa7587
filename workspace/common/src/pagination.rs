use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Pagination block attached to every list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pagination {
    /// 1-based page that was returned
    pub current_page: u64,
    /// `ceil(total / limit)`
    pub total_pages: u64,
    /// Number of matching records across all pages
    pub total: u64,
    /// Requested page size
    pub limit: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// Builds the pagination block. `limit` of zero is treated as one.
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        let limit = limit.max(1);
        let page = page.max(1);
        let total_pages = total.div_ceil(limit);

        Self {
            current_page: page,
            total_pages,
            total,
            limit,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// A page of items together with its pagination block.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pagination: Pagination) -> Self {
        Self { items, pagination }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 10, 1).total_pages, 1);
        assert_eq!(Pagination::new(1, 10, 10).total_pages, 1);
        assert_eq!(Pagination::new(1, 10, 11).total_pages, 2);
        assert_eq!(Pagination::new(1, 3, 100).total_pages, 34);
    }

    #[test]
    fn has_next_iff_page_below_total_pages() {
        for total in 0..40u64 {
            for limit in 1..7u64 {
                for page in 1..10u64 {
                    let p = Pagination::new(page, limit, total);
                    assert_eq!(p.total_pages, (total + limit - 1) / limit);
                    assert_eq!(p.has_next, page < p.total_pages);
                    assert_eq!(p.has_prev, page > 1);
                }
            }
        }
    }

    #[test]
    fn empty_result_has_no_neighbours() {
        let p = Pagination::new(1, 10, 0);
        assert!(!p.has_next);
        assert!(!p.has_prev);
    }

    #[test]
    fn serializes_in_envelope_shape() {
        let page = Page::new(vec![1, 2], Pagination::new(2, 2, 5));
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["pagination"]["current_page"], 2);
        assert_eq!(json["pagination"]["total_pages"], 3);
        assert_eq!(json["pagination"]["has_next"], true);
        assert_eq!(json["pagination"]["has_prev"], true);
        assert_eq!(json["items"].as_array().unwrap().len(), 2);
    }
}
