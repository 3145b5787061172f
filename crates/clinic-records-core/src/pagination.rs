//! Page arithmetic for the "all records" listing.

use serde::{Deserialize, Serialize};

/// Default number of patients per browse page.
pub const DEFAULT_RECORDS_PER_PAGE: u64 = 30;

/// Position within a paged listing. The requested page is clamped to the
/// pages that exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    pub total_pages: u64,
    pub total_records: u64,
    pub per_page: u64,
}

impl Pagination {
    pub fn new(total_records: u64, per_page: u64, requested_page: u64) -> Self {
        let per_page = per_page.max(1);
        let total_pages = total_records.div_ceil(per_page);
        let page = requested_page.clamp(1, total_pages.max(1));
        Self {
            page,
            total_pages,
            total_records,
            per_page,
        }
    }

    /// Row offset of the first record on this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.per_page
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.total_records == 0
    }

    /// Status line shown under the listing.
    pub fn label(&self) -> String {
        if self.is_empty() {
            return "No Records Found.".to_string();
        }
        format!(
            "Page {} of {} (Total: {} Records)",
            self.page, self.total_pages, self.total_records
        )
    }
}

/// A page of rows together with its position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_listing() {
        let p = Pagination::new(0, 30, 4);
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.offset(), 0);
        assert!(!p.has_previous());
        assert!(!p.has_next());
        assert_eq!(p.label(), "No Records Found.");
    }

    #[test]
    fn test_clamps_requested_page() {
        let p = Pagination::new(61, 30, 9);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.page, 3);
        assert_eq!(p.offset(), 60);
        assert!(p.has_previous());
        assert!(!p.has_next());

        let first = Pagination::new(61, 30, 0);
        assert_eq!(first.page, 1);
        assert!(first.has_next());
    }

    #[test]
    fn test_label() {
        let p = Pagination::new(45, 30, 2);
        assert_eq!(p.label(), "Page 2 of 2 (Total: 45 Records)");
    }

    #[test]
    fn test_exact_multiple() {
        let p = Pagination::new(60, 30, 2);
        assert_eq!(p.total_pages, 2);
        assert!(!p.has_next());
    }
}
