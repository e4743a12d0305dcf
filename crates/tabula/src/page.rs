use serde::Serialize;

/// Offset pagination over a query's results.
///
/// The total is filled in by the query that uses the paginator, from a
/// `COUNT(*)` issued just before the page itself is fetched. The two are
/// separate round trips, so concurrent writes can make them disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page: u64,
    per_page: u64,
    total: u64,
}

/// Where a page sits within the full result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub current_page: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page: u64,
    pub next_page: u64,
}

/// One page of records and its position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<M> {
    pub items: Vec<M>,
    pub info: PageInfo,
}

impl Paginator {
    pub const DEFAULT_PER_PAGE: u64 = 10;

    /// Pages are 1-based. A page of 0 becomes 1, and a `per_page` of 0
    /// becomes [`DEFAULT_PER_PAGE`](Self::DEFAULT_PER_PAGE).
    pub fn new(page: u64, per_page: u64) -> Paginator {
        Paginator {
            page: page.max(1),
            per_page: if per_page == 0 {
                Self::DEFAULT_PER_PAGE
            } else {
                per_page
            },
            total: 0,
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn set_total(&mut self, total: u64) {
        self.total = total;
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    pub fn limit(&self) -> u64 {
        self.per_page
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.per_page)
    }

    pub fn info(&self) -> PageInfo {
        let total_pages = self.total_pages();
        PageInfo {
            current_page: self.page,
            per_page: self.per_page,
            total_items: self.total,
            total_pages,
            has_previous: self.page > 1,
            has_next: self.page < total_pages,
            previous_page: (self.page - 1).max(1),
            next_page: self.page.saturating_add(1).min(total_pages),
        }
    }
}
