//! Answer orchestration.
//!
//! One question runs one search and, only when articles came back, one
//! model call. Failures never escape as `Err`: each stage maps its error to
//! an [`AnswerOutcome`] carrying the message shown to the reader.

use crate::backend::SearchBackend;
use crate::rag::types::{
    AnswerOutcome, NewsAnswer, GENERATION_FAILED_MESSAGE, SEARCH_FAILED_MESSAGE,
    SEARCH_UNAVAILABLE_MESSAGE,
};
use crate::search::{search_articles, SearchContext};
use crate::types::ArticleQuery;
use newsdesk_core::{AppConfig, AppError, AppResult, Article};
use newsdesk_llm::{LlmClient, LlmRequest};
use newsdesk_prompt::{parse_sections, PromptBuilder};
use std::sync::Arc;
use std::time::Duration;

/// Question-answering engine over a search backend and a language model.
///
/// Both handles are built once at startup and shared across questions.
pub struct NewsDesk {
    backend: Option<Arc<dyn SearchBackend>>,
    llm: Arc<dyn LlmClient>,
    prompts: PromptBuilder,
    search: SearchContext,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl NewsDesk {
    /// Create an engine from loaded configuration.
    ///
    /// `backend` is `None` when the index could not be reached at startup;
    /// every question then resolves to a search error.
    pub fn new(
        config: &AppConfig,
        backend: Option<Arc<dyn SearchBackend>>,
        llm: Arc<dyn LlmClient>,
    ) -> AppResult<Self> {
        Ok(Self {
            backend,
            llm,
            prompts: PromptBuilder::new(config.publication.clone())?,
            search: SearchContext {
                fields: config.search.fields.clone(),
                request_timeout: Duration::from_secs(config.search.request_timeout_secs),
            },
            model: config.llm.model.clone(),
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
        })
    }

    /// Answer one question.
    ///
    /// The question reaches the model exactly as asked; trimming only
    /// decides whether it is blank.
    pub async fn answer(&self, query: &ArticleQuery) -> NewsAnswer {
        let question = query.text.as_str();
        if question.trim().is_empty() {
            tracing::warn!("Ignoring blank question");
            return NewsAnswer::new(question, Vec::new(), AnswerOutcome::EmptyQuestion);
        }

        let articles =
            match search_articles(self.backend.as_deref(), query, &self.search).await {
                Ok(articles) => articles,
                Err(e) => {
                    return NewsAnswer::new(
                        question,
                        Vec::new(),
                        AnswerOutcome::SearchError {
                            message: search_error_message(&e),
                        },
                    );
                }
            };

        if articles.is_empty() {
            tracing::info!("No articles found, skipping generation");
            return NewsAnswer::new(question, articles, AnswerOutcome::NoArticles);
        }

        let outcome = match self.generate(question, &articles).await {
            Ok(raw) => {
                let answer = parse_sections(&raw);
                tracing::info!(
                    "Answer parsed into {} sections ({} malformed)",
                    answer.len(),
                    answer.malformed.len()
                );
                AnswerOutcome::Answered { answer, raw }
            }
            Err(e) => {
                tracing::error!("Generation error: {}", e);
                AnswerOutcome::GenerationError {
                    message: GENERATION_FAILED_MESSAGE.to_string(),
                }
            }
        };

        NewsAnswer::new(question, articles, outcome)
    }

    async fn generate(&self, question: &str, articles: &[Article]) -> AppResult<String> {
        let messages = self.prompts.build_messages(question, articles)?;

        let request = LlmRequest::new(messages, &self.model)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        tracing::info!(
            "Generating answer with {} ({}) from {} articles",
            self.llm.provider_name(),
            self.model,
            articles.len()
        );

        let response = self.llm.complete(&request).await?;

        tracing::debug!(
            "Completion used {} tokens",
            response.usage.total_tokens
        );

        Ok(response.content)
    }
}

fn search_error_message(err: &AppError) -> String {
    match err {
        AppError::SearchUnavailable(_) => SEARCH_UNAVAILABLE_MESSAGE.to_string(),
        other => format!("{}: {}", SEARCH_FAILED_MESSAGE, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SearchHit, SearchRequest};
    use newsdesk_llm::{ChatRole, LlmResponse, LlmUsage};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FixedBackend {
        hits: Vec<SearchHit>,
        fail: Option<String>,
    }

    #[async_trait::async_trait]
    impl SearchBackend for FixedBackend {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn ping(&self) -> AppResult<()> {
            Ok(())
        }

        async fn search(&self, _request: &SearchRequest) -> AppResult<Vec<SearchHit>> {
            match &self.fail {
                Some(reason) => Err(AppError::SearchFailed(reason.clone())),
                None => Ok(self.hits.clone()),
            }
        }
    }

    /// Model double that counts calls and keeps the last request.
    struct CountingLlm {
        reply: Option<String>,
        calls: AtomicUsize,
        last_request: Mutex<Option<LlmRequest>>,
    }

    impl CountingLlm {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply.to_string()),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for CountingLlm {
        fn provider_name(&self) -> &str {
            "counting"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            match &self.reply {
                Some(reply) => Ok(LlmResponse {
                    content: reply.clone(),
                    model: request.model.clone(),
                    usage: LlmUsage::new(100, 50),
                }),
                None => Err(AppError::GenerationFailed("rate limit exceeded".to_string())),
            }
        }
    }

    fn hit(title: &str, date: &str) -> SearchHit {
        serde_json::from_value(json!({
            "_score": 1.0,
            "_source": {"post_title": title, "post_date": date, "post_content": "Body text"}
        }))
        .unwrap()
    }

    fn backend(hits: Vec<SearchHit>) -> Option<Arc<dyn SearchBackend>> {
        Some(Arc::new(FixedBackend { hits, fail: None }))
    }

    fn desk(backend: Option<Arc<dyn SearchBackend>>, llm: Arc<CountingLlm>) -> NewsDesk {
        let mut config = AppConfig::default();
        config.publication = "Daily Ledger".to_string();
        NewsDesk::new(&config, backend, llm).unwrap()
    }

    #[tokio::test]
    async fn test_zero_articles_never_invokes_model() {
        let llm = CountingLlm::replying("unused");
        let desk = desk(backend(Vec::new()), llm.clone());

        let response = desk.answer(&ArticleQuery::new("port strike")).await;

        assert_eq!(response.outcome, AnswerOutcome::NoArticles);
        assert!(response.articles.is_empty());
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_search_failure_skips_model() {
        let llm = CountingLlm::replying("unused");
        let failing: Option<Arc<dyn SearchBackend>> = Some(Arc::new(FixedBackend {
            hits: Vec::new(),
            fail: Some("shard failure".to_string()),
        }));
        let desk = desk(failing, llm.clone());

        let response = desk.answer(&ArticleQuery::new("q")).await;

        match &response.outcome {
            AnswerOutcome::SearchError { message } => {
                assert!(message.starts_with(SEARCH_FAILED_MESSAGE));
                assert!(message.contains("shard failure"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_backend_reports_no_connection() {
        let llm = CountingLlm::replying("unused");
        let desk = desk(None, llm.clone());

        let response = desk.answer(&ArticleQuery::new("q")).await;

        assert_eq!(
            response.outcome.message(),
            Some(SEARCH_UNAVAILABLE_MESSAGE)
        );
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_transport_fault_reports_search_error_not_missing_connection() {
        let settings = newsdesk_core::SearchSettings {
            endpoint: Some("http://127.0.0.1:9".to_string()),
            index: Some("articles".to_string()),
            max_retries: 0,
            timeout_secs: 2,
            ..Default::default()
        };
        let client = crate::ElasticsearchClient::from_settings(&settings).unwrap();
        let llm = CountingLlm::replying("unused");
        let desk = desk(Some(Arc::new(client)), llm.clone());

        let response = desk.answer(&ArticleQuery::new("q")).await;

        match &response.outcome {
            AnswerOutcome::SearchError { message } => {
                assert!(message.starts_with(SEARCH_FAILED_MESSAGE));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_question_short_circuits() {
        let llm = CountingLlm::replying("unused");
        let desk = desk(backend(vec![hit("a", "2024-01-01")]), llm.clone());

        let response = desk.answer(&ArticleQuery::new("   ")).await;

        assert_eq!(response.outcome, AnswerOutcome::EmptyQuestion);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_yields_friendly_message() {
        let llm = CountingLlm::failing();
        let desk = desk(backend(vec![hit("a", "2024-01-01")]), llm.clone());

        let response = desk.answer(&ArticleQuery::new("q")).await;

        assert_eq!(
            response.outcome,
            AnswerOutcome::GenerationError {
                message: GENERATION_FAILED_MESSAGE.to_string()
            }
        );
        assert!(response.structured().is_none());
        assert_eq!(response.articles.len(), 1);
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_answer_is_sectioned_and_grounded() {
        let llm = CountingLlm::replying(
            "=== GLOBAL SYNTHESIS ===\nFuel prices rose.\n=== KEY POINTS & FIGURES ===\n- +4%",
        );
        let desk = desk(
            backend(vec![
                hit("Older", "2024-01-02 10:00:00"),
                hit("Newer", "2024-02-01 10:00:00"),
            ]),
            llm.clone(),
        );

        let response = desk.answer(&ArticleQuery::new("  fuel prices ")).await;

        let answer = response.structured().unwrap();
        assert_eq!(
            answer.pairs(),
            vec![
                ("GLOBAL SYNTHESIS", "Fuel prices rose."),
                ("KEY POINTS & FIGURES", "- +4%"),
            ]
        );
        assert_eq!(response.question, "  fuel prices ");
        assert_eq!(llm.calls(), 1);

        let request = llm.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.model, "gpt-3.5-turbo");
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(request.max_tokens, Some(2000));
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[0].role, ChatRole::System);
        assert_eq!(request.messages[2].role, ChatRole::User);
        assert_eq!(request.messages[2].content, "  fuel prices ");

        // Context numbering follows the date-sorted article order
        let context = &request.messages[1].content;
        assert!(context.starts_with("Available Daily Ledger articles:"));
        let newer = context.find("Title: Newer").unwrap();
        let older = context.find("Title: Older").unwrap();
        assert!(newer < older);
        assert!(context.contains("ARTICLE [1]"));
        assert!(context.contains("ARTICLE [2]"));
    }
}
