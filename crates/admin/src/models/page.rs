//! Pagination for the read-only listings.

/// Records shown per listing page.
pub const PAGE_SIZE: u64 = 10;

/// A requested listing page, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1 }
    }
}

impl PageRequest {
    /// Parse the `page` query parameter.
    ///
    /// Missing, non-numeric and zero values fall back to the first page.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|&page| page > 0)
            .map_or_else(Self::default, |page| Self { page })
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn number(self) -> u64 {
        self.page
    }

    /// Documents to skip before this page.
    #[must_use]
    pub const fn skip(self) -> u64 {
        (self.page - 1).saturating_mul(PAGE_SIZE)
    }

    /// Resolve against the collection size.
    #[must_use]
    pub const fn paginate(self, total: u64) -> Pagination {
        Pagination {
            page: self.page,
            total,
            has_prev: self.page > 1,
            has_next: self.page.saturating_mul(PAGE_SIZE) < total,
        }
    }
}

/// Navigation state for a rendered listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub total: u64,
    pub has_prev: bool,
    pub has_next: bool,
}

impl Pagination {
    #[must_use]
    pub const fn prev_page(&self) -> u64 {
        self.page.saturating_sub(1)
    }

    #[must_use]
    pub const fn next_page(&self) -> u64 {
        self.page.saturating_add(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fallbacks() {
        assert_eq!(PageRequest::parse(None).number(), 1);
        assert_eq!(PageRequest::parse(Some("")).number(), 1);
        assert_eq!(PageRequest::parse(Some("abc")).number(), 1);
        assert_eq!(PageRequest::parse(Some("0")).number(), 1);
        assert_eq!(PageRequest::parse(Some("-2")).number(), 1);
        assert_eq!(PageRequest::parse(Some(" 3 ")).number(), 3);
    }

    #[test]
    fn test_skip() {
        assert_eq!(PageRequest::parse(Some("1")).skip(), 0);
        assert_eq!(PageRequest::parse(Some("4")).skip(), 30);
    }

    #[test]
    fn test_paginate() {
        let first = PageRequest::default().paginate(25);
        assert!(!first.has_prev);
        assert!(first.has_next);

        let last = PageRequest::parse(Some("3")).paginate(25);
        assert!(last.has_prev);
        assert!(!last.has_next);
        assert_eq!(last.prev_page(), 2);

        let exact = PageRequest::parse(Some("2")).paginate(20);
        assert!(!exact.has_next);

        let empty = PageRequest::default().paginate(0);
        assert!(!empty.has_prev && !empty.has_next);
    }
}
