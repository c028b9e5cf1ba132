//! Public models for the student directory.
//!
//! `Student` mirrors the inbound record representation (`average_score`),
//! `StudentDraft` the outbound payload (`averageMarks`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::InvalidPageSize;

/// Identifier assigned by the record store.
pub type StudentId = u64;

/// A student record as held by the store.
///
/// Absent text fields decode to empty strings and absent numbers to `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub age: Option<u32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub average_score: Option<f64>,
}

impl Student {
    /// Average score as shown in the table (absent renders as 0).
    #[must_use]
    pub fn display_score(&self) -> f64 {
        self.average_score.unwrap_or(0.0)
    }
}

/// Field values for create and update requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    pub name: String,
    pub email: String,
    pub age: u32,
    pub average_marks: f64,
}

/// One page of students as reported by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    pub items: Vec<Student>,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_records: u64,
}

impl PageResult {
    /// Build a page, normalizing `total_pages` to at least 1 and `page` to 1
    /// when the store holds no records.
    #[must_use]
    pub fn new(
        items: Vec<Student>,
        page: u32,
        page_size: u32,
        total_pages: u32,
        total_records: u64,
    ) -> Self {
        let page = if total_records == 0 { 1 } else { page.max(1) };
        Self {
            items,
            page,
            page_size,
            total_pages: total_pages.max(1),
            total_records,
        }
    }

    /// Whether the requested page lies past the last page the store reports.
    #[must_use]
    pub fn is_past_end(&self) -> bool {
        self.total_records > 0 && self.page > self.total_pages
    }
}

/// Page sizes the directory offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageSize {
    Five,
    #[default]
    Ten,
    TwentyFive,
    Fifty,
}

impl PageSize {
    /// Every offered option, ascending.
    pub const ALL: [PageSize; 4] = [
        PageSize::Five,
        PageSize::Ten,
        PageSize::TwentyFive,
        PageSize::Fifty,
    ];

    #[must_use]
    pub fn get(self) -> u32 {
        match self {
            Self::Five => 5,
            Self::Ten => 10,
            Self::TwentyFive => 25,
            Self::Fifty => 50,
        }
    }
}

impl TryFrom<u32> for PageSize {
    type Error = InvalidPageSize;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|size| size.get() == value)
            .ok_or(InvalidPageSize(value))
    }
}

impl FromStr for PageSize {
    type Err = InvalidPageSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().parse::<u32>().map_err(|_| InvalidPageSize(0))?;
        Self::try_from(value)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Accepts a JSON number, a numeric string (as some SQL drivers emit for
/// DECIMAL columns) or null.
fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + serde::de::DeserializeOwned,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        Number(T),
        Text(String),
    }

    match Option::<Raw<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected a number, got \"{s}\""))),
    }
}
