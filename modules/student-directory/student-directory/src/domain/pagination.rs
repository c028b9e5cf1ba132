//! Page arithmetic for the listing table: clamping, the visible range, and
//! the pagination control links.

use std::fmt;

/// Bring a requested page into `1..=total_pages`.
///
/// `total_pages` of 0 is treated as 1.
#[must_use]
pub fn clamp_page(requested: i64, total_pages: u32) -> u32 {
    let last = i64::from(total_pages.max(1));
    // Both bounds fit in u32, so the narrowing cannot fail.
    u32::try_from(requested.clamp(1, last)).unwrap_or(1)
}

/// The 1-based record positions shown on the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRange {
    pub first: u64,
    pub last: u64,
    pub total: u64,
}

impl DisplayRange {
    /// Range for a listing page: `first = (page-1)*size + 1`, `last` capped by
    /// the total. An empty store shows `0 to 0`.
    #[must_use]
    pub fn for_page(page: u32, page_size: u32, total_records: u64) -> Self {
        if total_records == 0 {
            return Self::empty();
        }
        let page = u64::from(page.max(1));
        let size = u64::from(page_size);
        let first = ((page - 1) * size + 1).min(total_records);
        let last = (page * size).min(total_records);
        Self {
            first,
            last,
            total: total_records,
        }
    }

    /// Range covering every row shown at once, as search results are.
    #[must_use]
    pub fn all_rows(rows: usize) -> Self {
        let total = u64::try_from(rows).unwrap_or(u64::MAX);
        Self {
            first: u64::from(total > 0),
            last: total,
            total,
        }
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self {
            first: 0,
            last: 0,
            total: 0,
        }
    }
}

impl fmt::Display for DisplayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Showing {} to {} of {} entries",
            self.first, self.last, self.total
        )
    }
}

/// What a pagination control represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLinkLabel {
    First,
    Previous,
    Number(u32),
    Next,
    Last,
}

impl fmt::Display for PageLinkLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("First"),
            Self::Previous => f.write_str("Previous"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Next => f.write_str("Next"),
            Self::Last => f.write_str("Last"),
        }
    }
}

/// One pagination control and the page it leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLink {
    pub label: PageLinkLabel,
    pub target: u32,
    pub disabled: bool,
    pub active: bool,
}

/// Controls for the listing footer: First, Previous, one link per page, Next
/// and Last. Links leading nowhere are disabled.
#[must_use]
pub fn page_links(page: u32, total_pages: u32) -> Vec<PageLink> {
    let total = total_pages.max(1);
    let page = page.clamp(1, total);
    let at_start = page == 1;
    let at_end = page == total;

    let mut links = Vec::with_capacity(usize::try_from(total).unwrap_or(0) + 4);
    links.push(PageLink {
        label: PageLinkLabel::First,
        target: 1,
        disabled: at_start,
        active: false,
    });
    links.push(PageLink {
        label: PageLinkLabel::Previous,
        target: page.saturating_sub(1).max(1),
        disabled: at_start,
        active: false,
    });
    links.extend((1..=total).map(|n| PageLink {
        label: PageLinkLabel::Number(n),
        target: n,
        disabled: false,
        active: n == page,
    }));
    links.push(PageLink {
        label: PageLinkLabel::Next,
        target: (page + 1).min(total),
        disabled: at_end,
        active: false,
    });
    links.push(PageLink {
        label: PageLinkLabel::Last,
        target: total,
        disabled: at_end,
        active: false,
    });
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clamp_page_bounds() {
        assert_eq!(clamp_page(0, 5), 1);
        assert_eq!(clamp_page(-3, 5), 1);
        assert_eq!(clamp_page(3, 5), 3);
        assert_eq!(clamp_page(9, 5), 5);
        assert_eq!(clamp_page(4, 0), 1);
    }

    #[test]
    fn test_display_range_first_page() {
        let range = DisplayRange::for_page(1, 10, 37);
        assert_eq!((range.first, range.last, range.total), (1, 10, 37));
        assert_eq!(range.to_string(), "Showing 1 to 10 of 37 entries");
    }

    #[test]
    fn test_display_range_last_partial_page() {
        let range = DisplayRange::for_page(4, 10, 37);
        assert_eq!((range.first, range.last), (31, 37));
    }

    #[test]
    fn test_display_range_empty_store() {
        assert_eq!(DisplayRange::for_page(1, 10, 0), DisplayRange::empty());
        assert_eq!(
            DisplayRange::empty().to_string(),
            "Showing 0 to 0 of 0 entries"
        );
    }

    #[test]
    fn test_display_range_all_rows() {
        assert_eq!(DisplayRange::all_rows(15).first, 1);
        assert_eq!(DisplayRange::all_rows(15).last, 15);
        assert_eq!(DisplayRange::all_rows(0), DisplayRange::empty());
    }

    #[test]
    fn test_page_links_on_first_page() {
        let links = page_links(1, 3);
        assert_eq!(links.len(), 7);
        assert!(links[0].disabled && links[1].disabled);
        assert!(links[2].active);
        assert!(!links[5].disabled);
        assert_eq!(links[5].target, 2);
        assert_eq!(links[6].target, 3);
    }

    #[test]
    fn test_page_links_single_page_disables_navigation() {
        let links = page_links(1, 1);
        let navigation: Vec<_> = links
            .iter()
            .filter(|l| !matches!(l.label, PageLinkLabel::Number(_)))
            .collect();
        assert!(navigation.iter().all(|l| l.disabled));
    }

    proptest! {
        #[test]
        fn clamp_page_stays_in_range(requested in any::<i64>(), total in 0u32..10_000) {
            let page = clamp_page(requested, total);
            prop_assert!(page >= 1);
            prop_assert!(page <= total.max(1));
        }

        #[test]
        fn clamp_page_keeps_valid_pages(total in 1u32..10_000, offset in 0u32..10_000) {
            let requested = 1 + offset % total;
            prop_assert_eq!(clamp_page(i64::from(requested), total), requested);
        }

        #[test]
        fn display_range_within_total(page in 1u32..50, size in prop::sample::select(vec![5u32, 10, 25, 50]), total in 0u64..2_000) {
            let range = DisplayRange::for_page(page, size, total);
            prop_assert!(range.first <= range.last);
            prop_assert!(range.last <= total);
        }
    }
}
