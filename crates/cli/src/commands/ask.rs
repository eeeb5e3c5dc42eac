//! Ask command handler.
//!
//! Runs one question through search and generation, then prints the
//! analysis sections followed by the source article cards.

use chrono::NaiveDate;
use clap::Args;
use newsdesk_core::article::CARD_PREVIEW_CHARS;
use newsdesk_core::{config::AppConfig, AppResult, Article, SearchFilter, SortOrder};
use newsdesk_llm::create_client;
use newsdesk_search::{
    AnswerOutcome, ArticleQuery, ElasticsearchClient, NewsAnswer, NewsDesk, SearchBackend,
};
use std::sync::Arc;

/// Ask a question about the news
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Only use articles published on or after this date (YYYY-MM-DD)
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,

    /// Only use articles published on or before this date (YYYY-MM-DD)
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,

    /// Maximum number of articles to retrieve
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Result ordering (date, relevance)
    #[arg(long, value_parser = parse_sort)]
    pub sort: Option<SortOrder>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_sort(value: &str) -> Result<SortOrder, String> {
    SortOrder::parse(value).ok_or_else(|| format!("unknown sort order '{}' (date, relevance)", value))
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        config.validate()?;

        let llm = create_client(
            &config.llm.provider,
            config.llm.endpoint.as_deref(),
            config.llm.api_key.as_deref(),
        )?;

        // An unreachable index is reported per question, not as a startup failure
        let backend: Option<Arc<dyn SearchBackend>> =
            match ElasticsearchClient::connect(&config.search).await {
                Ok(client) => Some(Arc::new(client)),
                Err(e) => {
                    tracing::error!("Elasticsearch connection error: {}", e);
                    None
                }
            };

        let desk = NewsDesk::new(config, backend, llm)?;
        let response = desk.answer(&self.query(config)).await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            print!("{}", render_answer(&response));
        }

        Ok(())
    }

    /// Build the query from flags, falling back to configured defaults.
    fn query(&self, config: &AppConfig) -> ArticleQuery {
        ArticleQuery::new(self.question.clone())
            .with_limit(self.limit.unwrap_or(config.search.result_limit))
            .with_filter(SearchFilter::from_bounds(self.from, self.to))
            .with_sort(self.sort.unwrap_or(config.search.sort))
    }
}

/// Render a response as Markdown for the terminal.
pub fn render_answer(response: &NewsAnswer) -> String {
    let mut out = String::new();

    match &response.outcome {
        AnswerOutcome::Answered { answer, .. } => {
            out.push_str("## Full analysis\n\n");
            for section in answer {
                out.push_str(&format!("### {}\n\n", section.title));
                if !section.body.is_empty() {
                    out.push_str(&format!("{}\n\n", section.body));
                }
                out.push_str("---\n\n");
            }

            out.push_str("## Source articles\n\n");
            for (i, article) in response.articles.iter().enumerate() {
                out.push_str(&render_card(i + 1, article));
            }
        }
        outcome => {
            if let Some(message) = outcome.message() {
                out.push_str(&format!("{}\n", message));
            }
        }
    }

    out
}

fn render_card(position: usize, article: &Article) -> String {
    let mut card = String::new();
    card.push_str(&format!("### {}. {}\n\n", position, article.title));
    card.push_str(&format!("**Date:** {}  \n", article.date));
    card.push_str(&format!("**Category:** {}\n\n", article.category));
    card.push_str(&format!("{}\n\n", article.preview(CARD_PREVIEW_CHARS)));
    if article.has_image() {
        card.push_str(&format!("Image: {}  \n", article.image));
    }
    card.push_str(&format!("[Read the full article]({})\n\n", article.link));
    card.push_str("---\n\n");
    card
}
