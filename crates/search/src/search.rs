//! Article retrieval: build the query, call the backend, shape the result set.

use crate::backend::SearchBackend;
use crate::query::{build_search_request, hit_to_article};
use crate::types::{ArticleQuery, DEFAULT_REQUEST_TIMEOUT};
use newsdesk_core::{AppError, AppResult, Article, IndexFields, SearchFilter, SortOrder};
use std::time::Duration;

/// Search settings that shape every request.
#[derive(Debug, Clone)]
pub struct SearchContext {
    pub fields: IndexFields,
    pub request_timeout: Duration,
}

impl Default for SearchContext {
    fn default() -> Self {
        Self {
            fields: IndexFields::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Retrieve the ranked article set for a query.
///
/// Returns at most `query.limit` articles. With [`SortOrder::Date`] they are
/// ordered most recent first (stable for equal dates); with a date filter no
/// article dated outside the range is returned.
///
/// # Errors
/// - `AppError::SearchUnavailable` when there is no backend handle
/// - `AppError::SearchFailed` for any failure of the search call itself
///
/// No retries happen here.
pub async fn search_articles(
    backend: Option<&dyn SearchBackend>,
    query: &ArticleQuery,
    context: &SearchContext,
) -> AppResult<Vec<Article>> {
    let backend = backend.ok_or_else(|| {
        tracing::error!("Search requested without a backend connection");
        AppError::SearchUnavailable("no connection to the search backend".to_string())
    })?;

    tracing::info!(
        "Searching {} for '{}' (limit {}, sort {}, filter: {})",
        backend.name(),
        query.text,
        query.limit,
        query.sort.as_str(),
        query.filter.is_some()
    );

    let request = build_search_request(query, &context.fields, context.request_timeout);

    let hits = backend.search(&request).await.map_err(|e| {
        tracing::error!("Search error: {}", e);
        match e {
            AppError::SearchFailed(_) => e,
            other => AppError::SearchFailed(other.to_string()),
        }
    })?;

    let articles: Vec<Article> = hits
        .iter()
        .map(|hit| hit_to_article(hit, &context.fields))
        .collect();

    let articles = shape_results(articles, query);

    tracing::info!("Retrieved {} articles", articles.len());

    Ok(articles)
}

/// Enforce range, ordering and size on whatever the backend returned.
fn shape_results(mut articles: Vec<Article>, query: &ArticleQuery) -> Vec<Article> {
    if let Some(filter) = &query.filter {
        articles.retain(|article| within_filter(article, filter));
    }

    if query.sort == SortOrder::Date {
        // Undated articles go last
        articles.sort_by(|a, b| b.published_on().cmp(&a.published_on()));
    }

    articles.truncate(query.limit);
    articles
}

/// Only dates that parse are checked here; hits with an unparseable date
/// are kept and rely on the backend range filter.
fn within_filter(article: &Article, filter: &SearchFilter) -> bool {
    match article.published_on() {
        Some(date) if !filter.contains(date) => {
            tracing::warn!(
                "Dropping article '{}' dated {} outside {}..={}",
                article.title,
                date,
                filter.start_date,
                filter.end_date
            );
            false
        }
        _ => true,
    }
}
