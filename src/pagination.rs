//! Client-side page arithmetic for bot and file listings.

use std::ops::RangeInclusive;

pub const BOTS_PER_PAGE: usize = 4;
pub const FILES_PER_PAGE: usize = 5;
/// Page numbers shown at once in a page selector.
pub const MAX_VISIBLE_PAGES: usize = 3;

/// Number of pages needed for `len` items.
#[must_use]
pub fn page_count(len: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    len.div_ceil(per_page)
}

/// Items on 1-based `page`; empty when the page is out of range.
#[must_use]
pub fn page_slice<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    if page == 0 || per_page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(per_page);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(per_page).min(items.len());
    &items[start..end]
}

/// Page numbers to show around `current`, at most [`MAX_VISIBLE_PAGES`] wide
/// and clamped to `1..=total`.
#[must_use]
pub fn page_window(current: usize, total: usize) -> RangeInclusive<usize> {
    if total == 0 {
        return RangeInclusive::new(1, 0);
    }

    let current = current.clamp(1, total);
    let mut start = current.saturating_sub(MAX_VISIBLE_PAGES / 2).max(1);
    let mut end = start + MAX_VISIBLE_PAGES - 1;
    if end > total {
        end = total;
        start = (end + 1).saturating_sub(MAX_VISIBLE_PAGES).max(1);
    }
    start..=end
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub total_pages: usize,
    pub window: RangeInclusive<usize>,
}

impl<'a, T> Page<'a, T> {
    /// Slices `items` for `page`, clamping the page into range.
    pub fn of(items: &'a [T], page: usize, per_page: usize) -> Self {
        let total_pages = page_count(items.len(), per_page);
        let page = page.clamp(1, total_pages.max(1));
        Self {
            items: page_slice(items, page, per_page),
            page,
            total_pages,
            window: page_window(page, total_pages),
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}
