//! Search request and hit types.

use newsdesk_core::article::DEFAULT_RESULT_LIMIT;
use newsdesk_core::{SearchFilter, SortOrder};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-search request timeout used when the settings do not say otherwise.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A question to run against the article index.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleQuery {
    /// Free-text question
    pub text: String,

    /// Maximum number of articles to return
    pub limit: usize,

    /// Optional inclusive publication-date range
    pub filter: Option<SearchFilter>,

    /// Final ordering of the result set
    pub sort: SortOrder,
}

impl ArticleQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            limit: DEFAULT_RESULT_LIMIT,
            filter: None,
            sort: SortOrder::Date,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_filter(mut self, filter: Option<SearchFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }
}

/// Request handed to a [`crate::backend::SearchBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Query DSL body
    pub body: serde_json::Value,

    /// Request timeout for this call
    pub timeout: Duration,
}

/// One matched document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchHit {
    /// Projected source document
    #[serde(rename = "_source", default)]
    pub source: serde_json::Map<String, serde_json::Value>,

    /// Relevance score (absent when the backend did not compute one)
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
}
