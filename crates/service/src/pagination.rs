//! Pagination utilities for service layer
//!
//! Provides a simple `Pagination` struct and helpers to normalize inputs
//! and cut a page out of an already filtered result set.

use std::ops::Range;

/// Upper bound applied to page sizes coming from callers.
pub const MAX_PER_PAGE: u32 = 100;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    /// Clamp to sane defaults: page 0 becomes 1, per_page is clamped to `1..=MAX_PER_PAGE`.
    pub fn normalize(self) -> Self {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, MAX_PER_PAGE);
        Self { page, per_page }
    }

    /// Index of the first item on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }

    /// Range of item indices visible on this page given `total` matching items.
    /// Empty when the page lies past the end.
    pub fn window(&self, total: usize) -> Range<usize> {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX).min(total);
        let end = start.saturating_add(self.per_page as usize).min(total);
        start..end
    }

    /// Number of pages needed for `total` items (at least 1).
    pub fn page_count(&self, total: u64) -> u64 {
        let per = u64::from(self.per_page.max(1));
        total.div_ceil(per).max(1)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 10 } }
}

#[cfg(test)]
mod tests {
    use super::Pagination;

    #[test]
    fn normalize_clamps_zero_to_defaults() {
        let p = Pagination { page: 0, per_page: 0 }.normalize();
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, 1);
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let p = Pagination { page: 5, per_page: 1000 }.normalize();
        assert_eq!(p.offset(), 400);
        assert_eq!(p.per_page, 100);
    }

    #[test]
    fn window_matches_page_length_formula() {
        // items.len == min(s, total - (p-1)*s) when total > (p-1)*s, else 0
        for total in 0..35usize {
            for page in 1..6u32 {
                let s = 10u32;
                let w = Pagination { page, per_page: s }.window(total);
                let skipped = ((page - 1) * s) as usize;
                let expected = if total > skipped { (s as usize).min(total - skipped) } else { 0 };
                assert_eq!(w.len(), expected, "total={total} page={page}");
            }
        }
    }

    #[test]
    fn page_count_rounds_up() {
        let p = Pagination { page: 1, per_page: 10 };
        assert_eq!(p.page_count(0), 1);
        assert_eq!(p.page_count(10), 1);
        assert_eq!(p.page_count(21), 3);
    }

    #[test]
    fn default_values_are_sane() {
        let d = Pagination::default();
        assert_eq!(d.page, 1);
        assert_eq!(d.per_page, 10);
    }
}
