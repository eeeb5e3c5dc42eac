//! Search backend abstraction.
//!
//! Defines a trait for the full-text index so that the query builder and
//! pipeline can run against Elasticsearch or an in-memory double.

use crate::types::{SearchHit, SearchRequest};
use newsdesk_core::AppResult;

/// Trait for full-text search backends.
///
/// Implementations must:
/// - return hits in the order the backend produced them
/// - report an unreachable backend from `ping` as `AppError::SearchUnavailable`
/// - report every `search` failure, connection errors included, as `AppError::SearchFailed`
#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    /// Backend name for logging (e.g., "elasticsearch").
    fn name(&self) -> &str;

    /// Check that the backend is reachable.
    async fn ping(&self) -> AppResult<()>;

    /// Execute one search request.
    async fn search(&self, request: &SearchRequest) -> AppResult<Vec<SearchHit>>;
}
