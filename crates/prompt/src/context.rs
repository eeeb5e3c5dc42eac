//! Assembly of retrieved articles into the bounded prompt context.

use handlebars::Handlebars;
use newsdesk_core::{AppError, AppResult, Article};
use serde::Serialize;

/// Characters of article body kept in the prompt context.
pub const CONTEXT_CONTENT_CHARS: usize = 1500;

/// Line separating two article blocks.
pub const ARTICLE_DELIMITER: &str = "-------------------";

/// Registry name of the per-article block template.
pub(crate) const ARTICLE_TEMPLATE_NAME: &str = "article_block";

pub(crate) const ARTICLE_TEMPLATE: &str = "ARTICLE [{{index}}]:
Title: {{title}}
Date: {{date}}
URL: {{link}}
Category: {{category}}

CONTENT:
{{content}}
";

#[derive(Serialize)]
struct ArticleBlock<'a> {
    index: usize,
    title: &'a str,
    date: &'a str,
    link: &'a str,
    category: &'a str,
    content: &'a str,
}

/// Return at most the first `max_chars` characters of `text`.
///
/// Hard cutoff on character boundaries; words may be split.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Render all articles into one context string.
///
/// Article `i` (1-based, in input order) is labeled `ARTICLE [i]`; this is
/// the citation key the model is told to use, so the input order must not
/// change between here and message emission.
pub(crate) fn render_context(
    registry: &Handlebars<'static>,
    articles: &[Article],
) -> AppResult<String> {
    let mut context = String::new();

    for (i, article) in articles.iter().enumerate() {
        let block = ArticleBlock {
            index: i + 1,
            title: &article.title,
            date: &article.date,
            link: &article.link,
            category: &article.category,
            content: truncate_chars(&article.content, CONTEXT_CONTENT_CHARS),
        };

        let rendered = registry
            .render(ARTICLE_TEMPLATE_NAME, &block)
            .map_err(|e| AppError::Prompt(format!("Failed to render article {}: {}", i + 1, e)))?;

        context.push('\n');
        context.push_str(&rendered);
        context.push('\n');
        context.push_str(ARTICLE_DELIMITER);
        context.push('\n');
    }

    tracing::debug!(
        "Assembled context from {} articles ({} chars)",
        articles.len(),
        context.chars().count()
    );

    Ok(context)
}
