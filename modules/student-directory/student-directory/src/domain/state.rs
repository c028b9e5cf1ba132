use student_directory_sdk::{ErrorKind, PageSize, Student};

use super::pagination::DisplayRange;

/// How the rows currently shown were obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DirectoryMode {
    /// A server-paged listing.
    #[default]
    Listing,
    /// At most one row from an id lookup.
    SearchingById,
    /// Client-side name filter over a bulk fetch.
    SearchingByName,
}

/// Pagination counters as last reported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_records: u64,
}

impl Pagination {
    /// Before the first response: page 1 of an empty store.
    #[must_use]
    pub fn initial(page_size: PageSize) -> Self {
        Self {
            page: 1,
            page_size: page_size.get(),
            total_pages: 1,
            total_records: 0,
        }
    }

    /// Search results are shown on a single page.
    #[must_use]
    pub fn single_page(rows: usize, page_size: u32) -> Self {
        Self {
            page: 1,
            page_size,
            total_pages: 1,
            total_records: u64::try_from(rows).unwrap_or(u64::MAX),
        }
    }
}

/// What the table area should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus {
    Loading,
    Populated,
    Empty,
    Errored(ErrorKind),
}

/// Snapshot of everything the directory view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryState {
    pub mode: DirectoryMode,
    pub rows: Vec<Student>,
    pub pagination: Pagination,
    pub loading: bool,
    pub last_error: Option<ErrorKind>,
}

impl DirectoryState {
    #[must_use]
    pub fn new(page_size: PageSize) -> Self {
        Self {
            mode: DirectoryMode::Listing,
            rows: Vec::new(),
            pagination: Pagination::initial(page_size),
            loading: false,
            last_error: None,
        }
    }

    /// Paging, limit and search controls accept input only while idle.
    #[must_use]
    pub fn controls_enabled(&self) -> bool {
        !self.loading
    }

    #[must_use]
    pub fn status(&self) -> ViewStatus {
        if self.loading {
            ViewStatus::Loading
        } else if !self.rows.is_empty() {
            ViewStatus::Populated
        } else if let Some(kind) = self.last_error {
            ViewStatus::Errored(kind)
        } else {
            ViewStatus::Empty
        }
    }

    /// Positions of the shown rows for the "Showing x to y of z" summary.
    ///
    /// `first` is 0 whenever no rows are shown, including after a failed
    /// listing that kept the previous totals.
    #[must_use]
    pub fn display_range(&self) -> DisplayRange {
        match self.mode {
            DirectoryMode::Listing => {
                let range = DisplayRange::for_page(
                    self.pagination.page,
                    self.pagination.page_size,
                    self.pagination.total_records,
                );
                if self.rows.is_empty() {
                    DisplayRange { first: 0, ..range }
                } else {
                    range
                }
            }
            DirectoryMode::SearchingById | DirectoryMode::SearchingByName => {
                DisplayRange::all_rows(self.rows.len())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: u64) -> Student {
        Student {
            id,
            name: format!("Student {id}"),
            email: format!("s{id}@example.com"),
            age: Some(20),
            average_score: Some(75.0),
        }
    }

    #[test]
    fn test_initial_state() {
        let state = DirectoryState::new(PageSize::Ten);
        assert_eq!(state.mode, DirectoryMode::Listing);
        assert_eq!(state.pagination.page, 1);
        assert_eq!(state.pagination.page_size, 10);
        assert!(state.controls_enabled());
        assert_eq!(state.status(), ViewStatus::Empty);
    }

    #[test]
    fn test_status_precedence() {
        let mut state = DirectoryState::new(PageSize::Five);
        state.last_error = Some(ErrorKind::Network);
        assert_eq!(state.status(), ViewStatus::Errored(ErrorKind::Network));

        // A failed search keeps the previous rows on screen.
        state.rows.push(student(1));
        assert_eq!(state.status(), ViewStatus::Populated);

        state.loading = true;
        assert_eq!(state.status(), ViewStatus::Loading);
        assert!(!state.controls_enabled());
    }

    #[test]
    fn test_search_range_covers_all_rows() {
        let mut state = DirectoryState::new(PageSize::Ten);
        state.mode = DirectoryMode::SearchingByName;
        state.rows = (1..=15).map(student).collect();
        state.pagination = Pagination::single_page(15, 10);

        let range = state.display_range();
        assert_eq!((range.first, range.last, range.total), (1, 15, 15));
    }

    #[test]
    fn test_listing_range_uses_pagination() {
        let mut state = DirectoryState::new(PageSize::Ten);
        state.pagination = Pagination {
            page: 2,
            page_size: 10,
            total_pages: 3,
            total_records: 25,
        };
        state.rows = (11..=20).map(student).collect();
        assert_eq!(state.display_range().to_string(), "Showing 11 to 20 of 25 entries");
    }

    #[test]
    fn test_listing_range_without_rows_starts_at_zero() {
        let mut state = DirectoryState::new(PageSize::Ten);
        state.pagination = Pagination {
            page: 2,
            page_size: 10,
            total_pages: 3,
            total_records: 25,
        };
        let range = state.display_range();
        assert_eq!((range.first, range.last, range.total), (0, 20, 25));
    }
}
