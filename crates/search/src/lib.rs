//! Article search and question answering for Newsdesk.
//!
//! - Query building: question + optional date range → search DSL body
//! - Backends: the [`SearchBackend`] trait and its Elasticsearch client
//! - Retrieval: bounded, date-ordered article sets
//! - Answering: search → prompt → model → sections ([`NewsDesk`])

pub mod backend;
pub mod elasticsearch;
pub mod query;
pub mod rag;
pub mod search;
pub mod types;

// Re-export commonly used types
pub use backend::SearchBackend;
pub use elasticsearch::ElasticsearchClient;
pub use query::{build_search_body, build_search_request, hit_to_article};
pub use rag::{AnswerOutcome, NewsAnswer, NewsDesk};
pub use search::{search_articles, SearchContext};
pub use types::{ArticleQuery, SearchHit, SearchRequest};
