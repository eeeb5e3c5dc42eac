//! Article record and date filter shared across crates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default number of articles retrieved per question.
pub const DEFAULT_RESULT_LIMIT: usize = 15;

/// Characters of body text shown on an article card.
pub const CARD_PREVIEW_CHARS: usize = 300;

/// A news article retrieved for one question.
///
/// Built fresh from each search hit and never mutated afterwards. Fields the
/// index omits are left empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub content: String,
    /// ISO date string as stored in the index (may carry a time part)
    pub date: String,
    pub link: String,
    pub image: String,
    pub category: String,
    /// Backend relevance score; only comparable within one result set
    pub score: f64,
}

impl Article {
    /// Calendar date of publication, if the stored date is ISO formatted.
    ///
    /// Accepts `YYYY-MM-DD` optionally followed by a time part
    /// (`2024-03-15 10:22:01`, `2024-03-15T10:22:01Z`).
    pub fn published_on(&self) -> Option<NaiveDate> {
        let day = self.date.trim().get(..10)?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }

    /// Short body preview for card display.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.content.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{}...", head)
        } else {
            head
        }
    }

    pub fn has_image(&self) -> bool {
        !self.image.trim().is_empty()
    }
}

/// Inclusive publication-date range.
///
/// Precondition: `start_date <= end_date`. The range is not validated here;
/// an inverted range simply matches nothing in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl SearchFilter {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    /// Build a filter only when both bounds are supplied.
    pub fn from_bounds(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<Self> {
        match (start, end) {
            (Some(start), Some(end)) => Some(Self::new(start, end)),
            _ => None,
        }
    }

    /// Whether a date lies within the range, bounds included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}
