//! Search query classification and resolution.
//!
//! A purely numeric query is an id lookup. Anything else filters the first
//! bulk page of records by name, case-insensitively.

use student_directory_sdk::{GatewayError, Student, StudentGateway, StudentId};
use tracing::debug;

use super::state::DirectoryMode;

/// Records fetched for a name search. Matches beyond this window are not found.
pub const BULK_SEARCH_SIZE: u32 = 100;

/// A classified search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Blank input; the directory returns to listing.
    Empty,
    /// Numeric input. `None` when the number cannot be a store id
    /// (zero, negative, or too large).
    ById(Option<StudentId>),
    /// Trimmed text to match against names.
    ByName(String),
}

impl SearchQuery {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let query = raw.trim();
        if query.is_empty() {
            return Self::Empty;
        }
        let digits = query.strip_prefix(['+', '-']).unwrap_or(query);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            let id = query
                .parse::<i64>()
                .ok()
                .and_then(|n| StudentId::try_from(n).ok())
                .filter(|id| *id > 0);
            return Self::ById(id);
        }
        Self::ByName(query.to_owned())
    }

    /// The mode the directory enters for this query.
    #[must_use]
    pub fn mode(&self) -> DirectoryMode {
        match self {
            Self::Empty => DirectoryMode::Listing,
            Self::ById(_) => DirectoryMode::SearchingById,
            Self::ByName(_) => DirectoryMode::SearchingByName,
        }
    }
}

/// Rows produced by a search, plus whether an id lookup came up empty.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResolution {
    pub mode: DirectoryMode,
    pub rows: Vec<Student>,
    pub id_not_found: bool,
}

/// Keep students whose name contains `needle`, ignoring case. Order is kept.
#[must_use]
pub fn filter_by_name(students: Vec<Student>, needle: &str) -> Vec<Student> {
    let needle = needle.to_lowercase();
    students
        .into_iter()
        .filter(|s| s.name.to_lowercase().contains(&needle))
        .collect()
}

/// Run a non-empty query against the store.
///
/// An id that does not exist yields no rows with `id_not_found` set; it is
/// not an error.
///
/// # Errors
/// Returns the gateway error for any failure other than a missing id.
pub async fn resolve(
    gateway: &dyn StudentGateway,
    query: &SearchQuery,
    bulk_size: u32,
) -> Result<SearchResolution, GatewayError> {
    let mode = query.mode();
    let (rows, id_not_found) = match query {
        SearchQuery::Empty => (Vec::new(), false),
        SearchQuery::ById(None) => {
            debug!("query is not a valid id, skipping lookup");
            (Vec::new(), true)
        }
        SearchQuery::ById(Some(id)) => match gateway.get_by_id(*id).await {
            Ok(student) => (vec![student], false),
            Err(GatewayError::NotFound { .. }) => (Vec::new(), true),
            Err(err) => return Err(err),
        },
        SearchQuery::ByName(needle) => {
            let page = gateway.list_page(1, bulk_size).await?;
            let fetched = page.items.len();
            let rows = filter_by_name(page.items, needle);
            debug!(fetched, matched = rows.len(), "filtered names");
            (rows, false)
        }
    };
    Ok(SearchResolution {
        mode,
        rows,
        id_not_found,
    })
}
