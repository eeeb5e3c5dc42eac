//! Query DSL construction and hit mapping.

use crate::types::{ArticleQuery, SearchHit, SearchRequest};
use newsdesk_core::{Article, IndexFields, SortOrder};
use serde_json::{json, Map, Value};
use std::time::Duration;

/// Title matches weigh the most.
pub const TITLE_BOOST: u32 = 3;

/// Body matches count double.
pub const CONTENT_BOOST: u32 = 2;

/// Share of query terms a document must match.
pub const MINIMUM_SHOULD_MATCH: &str = "50%";

/// Build the search body for a query.
///
/// - `must`: one `multi_match` over title^3, content^2 and category,
///   OR between terms, at least 50% of terms matching;
/// - `filter` (only with a date range): non-scoring `range` on the date field;
/// - `_source`: fixed projection of the article fields;
/// - `sort`: date descending for [`SortOrder::Date`], backend score otherwise.
pub fn build_search_body(query: &ArticleQuery, fields: &IndexFields) -> Value {
    let mut bool_query = Map::new();
    bool_query.insert(
        "must".to_string(),
        json!([{
            "multi_match": {
                "query": query.text,
                "fields": [
                    format!("{}^{}", fields.title, TITLE_BOOST),
                    format!("{}^{}", fields.content, CONTENT_BOOST),
                    fields.category,
                ],
                "type": "best_fields",
                "operator": "or",
                "minimum_should_match": MINIMUM_SHOULD_MATCH,
            }
        }]),
    );

    if let Some(filter) = &query.filter {
        bool_query.insert(
            "filter".to_string(),
            json!([{
                "range": {
                    fields.date.as_str(): {
                        "gte": filter.start_date.format("%Y-%m-%d").to_string(),
                        "lte": filter.end_date.format("%Y-%m-%d").to_string(),
                    }
                }
            }]),
        );
    }

    let mut body = json!({
        "query": { "bool": bool_query },
        "_source": [
            fields.title,
            fields.content,
            fields.date,
            fields.link,
            fields.id,
            fields.image,
            fields.category,
        ],
        "size": query.limit,
    });

    if query.sort == SortOrder::Date {
        body["sort"] = json!([{ fields.date.as_str(): { "order": "desc" } }]);
        // Keep _score populated even though it no longer drives the order
        body["track_scores"] = json!(true);
    }

    body
}

/// Build the full request handed to a backend.
pub fn build_search_request(
    query: &ArticleQuery,
    fields: &IndexFields,
    timeout: Duration,
) -> SearchRequest {
    SearchRequest {
        body: build_search_body(query, fields),
        timeout,
    }
}

/// Read a source field as text; missing and null become empty.
fn field_text(source: &Map<String, Value>, field: &str) -> String {
    match source.get(field) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Map one hit to an article.
pub fn hit_to_article(hit: &SearchHit, fields: &IndexFields) -> Article {
    let source = &hit.source;
    Article {
        id: field_text(source, &fields.id),
        title: field_text(source, &fields.title),
        content: field_text(source, &fields.content),
        date: field_text(source, &fields.date),
        link: field_text(source, &fields.link),
        image: field_text(source, &fields.image),
        category: field_text(source, &fields.category),
        score: hit.score.unwrap_or(0.0),
    }
}
