//! Pagination metadata and the model behind pagination controls.

use serde::{Deserialize, Serialize};

/// Default number of products per listing page.
pub const DEFAULT_PAGE_SIZE: u32 = 9;

/// Maximum numbered page buttons shown at once.
pub const MAX_VISIBLE_PAGES: u32 = 5;

/// Pagination block returned with every listing (`meta.pagination`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            page_count: 1,
            total: 0,
        }
    }
}

impl Pagination {
    /// Build a pagination block, deriving `page_count` from `total`.
    #[must_use]
    pub const fn new(page: u32, page_size: u32, total: u32) -> Self {
        Self {
            page,
            page_size,
            page_count: page_count(total, page_size),
            total,
        }
    }

    /// 1-based indices of the first and last item on the current page.
    ///
    /// Returns `(0, 0)` for an empty listing.
    #[must_use]
    pub fn current_range(&self) -> (u32, u32) {
        if self.total == 0 {
            return (0, 0);
        }
        let start = self.page.saturating_sub(1).saturating_mul(self.page_size) + 1;
        let end = self.page.saturating_mul(self.page_size).min(self.total);
        (start, end)
    }

    /// Whether `page` is a page this listing can navigate to.
    #[must_use]
    pub const fn contains_page(&self, page: u32) -> bool {
        page >= 1 && page <= if self.page_count == 0 { 1 } else { self.page_count }
    }

    /// Model for a pagination control centred on `current`.
    #[must_use]
    pub fn page_window(&self, current: u32) -> PageWindow {
        PageWindow::new(current, self.page_count)
    }
}

/// `ceil(total / page_size)`; zero when `page_size` is zero.
#[must_use]
pub const fn page_count(total: u32, page_size: u32) -> u32 {
    if page_size == 0 {
        0
    } else {
        total.div_ceil(page_size)
    }
}

/// One slot in a pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    /// A numbered page button.
    Page { number: u32, active: bool },
    /// A gap between numbered buttons.
    Ellipsis,
}

/// Pagination control layout: prev/next state plus numbered links.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageWindow {
    pub links: Vec<PageLink>,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PageWindow {
    /// Lay out at most [`MAX_VISIBLE_PAGES`] numbered pages around `current`,
    /// always linking the first and last page. Empty for a single page.
    #[must_use]
    pub fn new(current: u32, page_count: u32) -> Self {
        if page_count <= 1 {
            return Self::default();
        }
        let current = current.clamp(1, page_count);

        let mut start = current.saturating_sub(MAX_VISIBLE_PAGES / 2).max(1);
        let end = (start + MAX_VISIBLE_PAGES - 1).min(page_count);
        if end - start + 1 < MAX_VISIBLE_PAGES {
            start = (end + 1).saturating_sub(MAX_VISIBLE_PAGES).max(1);
        }

        let mut links = Vec::new();
        if start > 1 {
            links.push(PageLink::Page {
                number: 1,
                active: false,
            });
            if start > 2 {
                links.push(PageLink::Ellipsis);
            }
        }
        links.extend((start..=end).map(|number| PageLink::Page {
            number,
            active: number == current,
        }));
        if end < page_count {
            if end < page_count - 1 {
                links.push(PageLink::Ellipsis);
            }
            links.push(PageLink::Page {
                number: page_count,
                active: false,
            });
        }

        Self {
            links,
            has_previous: current > 1,
            has_next: current < page_count,
        }
    }

    /// Page numbers in display order (ellipses skipped).
    #[must_use]
    pub fn numbers(&self) -> Vec<u32> {
        self.links
            .iter()
            .filter_map(|link| match link {
                PageLink::Page { number, .. } => Some(*number),
                PageLink::Ellipsis => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_rounds_up() {
        assert_eq!(page_count(23, 9), 3);
        assert_eq!(page_count(18, 9), 2);
        assert_eq!(page_count(0, 9), 0);
        assert_eq!(page_count(5, 0), 0);
        assert_eq!(Pagination::new(1, 9, 23).page_count, 3);
    }

    #[test]
    fn test_current_range() {
        assert_eq!(Pagination::new(1, 9, 23).current_range(), (1, 9));
        assert_eq!(Pagination::new(3, 9, 23).current_range(), (19, 23));
        assert_eq!(Pagination::new(1, 9, 0).current_range(), (0, 0));
    }

    #[test]
    fn test_contains_page() {
        let pagination = Pagination::new(1, 9, 23);
        assert!(pagination.contains_page(3));
        assert!(!pagination.contains_page(0));
        assert!(!pagination.contains_page(4));
        assert!(Pagination::new(1, 9, 0).contains_page(1));
    }

    #[test]
    fn test_window_single_page_is_empty() {
        assert_eq!(PageWindow::new(1, 1), PageWindow::default());
    }

    #[test]
    fn test_window_small_listing() {
        let window = PageWindow::new(2, 3);
        assert_eq!(window.numbers(), vec![1, 2, 3]);
        assert!(!window.links.contains(&PageLink::Ellipsis));
        assert!(window.has_previous);
        assert!(window.has_next);
    }

    #[test]
    fn test_window_middle_has_both_ellipses() {
        let window = PageWindow::new(10, 20);
        assert_eq!(window.numbers(), vec![1, 8, 9, 10, 11, 12, 20]);
        assert_eq!(window.links[1], PageLink::Ellipsis);
        assert_eq!(window.links[window.links.len() - 2], PageLink::Ellipsis);
        assert!(window.links.contains(&PageLink::Page {
            number: 10,
            active: true
        }));
    }

    #[test]
    fn test_window_edges() {
        let first = PageWindow::new(1, 20);
        assert_eq!(first.numbers(), vec![1, 2, 3, 4, 5, 20]);
        assert!(!first.has_previous);

        let last = PageWindow::new(20, 20);
        assert_eq!(last.numbers(), vec![1, 16, 17, 18, 19, 20]);
        assert!(!last.has_next);
    }

    #[test]
    fn test_window_adjacent_edge_has_no_ellipsis() {
        // Window 2..=6 sits next to page 1, so no gap marker before it.
        let window = PageWindow::new(4, 7);
        assert_eq!(window.numbers(), vec![1, 2, 3, 4, 5, 6, 7]);
        assert!(!window.links.contains(&PageLink::Ellipsis));
    }
}
