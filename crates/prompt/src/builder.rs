//! Prompt builder: grounding instructions, article context and the user question.

use crate::context::{render_context, ARTICLE_TEMPLATE, ARTICLE_TEMPLATE_NAME};
use handlebars::Handlebars;
use newsdesk_core::{AppError, AppResult, Article};
use newsdesk_llm::ChatMessage;
use serde::Serialize;

/// Section headings the model is asked to produce, in template order.
pub const SECTION_TITLES: [&str; 5] = [
    "GLOBAL SYNTHESIS",
    "DETAILED CHRONOLOGY",
    "KEY POINTS & FIGURES",
    "ANALYSIS & IMPLICATIONS",
    "SOURCE ARTICLES",
];

const INSTRUCTIONS_TEMPLATE_NAME: &str = "instructions";

const INSTRUCTIONS_TEMPLATE: &str = r#"You are the virtual assistant of {{publication}}, answering questions about its news coverage.

STRICT RULES:
1. Base your answer ONLY on the {{publication}} articles provided
2. NEVER draw on outside knowledge
3. If a piece of information is not in the articles, say so explicitly
4. SYSTEMATICALLY cite your sources with [Article N], where N is the number shown in "ARTICLE [N]"
5. Organize your answer chronologically
6. Provide direct links to the cited articles

MANDATORY RESPONSE FORMAT:
=== GLOBAL SYNTHESIS ===
(Overview of the topic in 4-5 sentences)

=== DETAILED CHRONOLOGY ===
(Chronological list of events with precise dates)
- DD/MM/YYYY: Event 1 [Article X]
- DD/MM/YYYY: Event 2 [Article Y]
...

=== KEY POINTS & FIGURES ===
• Key point 1 [Article X]
• Key statistic or figure [Article Y]
...

=== ANALYSIS & IMPLICATIONS ===
(In-depth analysis of impacts and outlook)

=== SOURCE ARTICLES ===
1. "[Exact title]" (DD/MM/YYYY) - [Full URL]
2. "[Exact title]" (DD/MM/YYYY) - [Full URL]
..."#;

#[derive(Serialize)]
struct InstructionVars<'a> {
    publication: &'a str,
}

/// Builds the three-message sequence sent to the language model.
///
/// Templates are registered once; building messages afterwards is pure
/// formatting with no I/O.
pub struct PromptBuilder {
    registry: Handlebars<'static>,
    publication: String,
}

impl PromptBuilder {
    /// Create a builder for the given publication name.
    pub fn new(publication: impl Into<String>) -> AppResult<Self> {
        let mut registry = Handlebars::new();

        // Plain text prompts: never HTML-escape titles or URLs
        registry.register_escape_fn(handlebars::no_escape);

        registry
            .register_template_string(INSTRUCTIONS_TEMPLATE_NAME, INSTRUCTIONS_TEMPLATE)
            .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;
        registry
            .register_template_string(ARTICLE_TEMPLATE_NAME, ARTICLE_TEMPLATE)
            .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

        Ok(Self {
            registry,
            publication: publication.into(),
        })
    }

    /// Render the grounding rules and the mandatory section template.
    pub fn system_instructions(&self) -> AppResult<String> {
        self.registry
            .render(
                INSTRUCTIONS_TEMPLATE_NAME,
                &InstructionVars {
                    publication: &self.publication,
                },
            )
            .map_err(|e| AppError::Prompt(format!("Failed to render instructions: {}", e)))
    }

    /// Build the ordered message sequence for one question.
    ///
    /// Produces exactly three messages: the instructions (system), the
    /// article context (system) and the verbatim question (user). Articles
    /// are numbered by their position in `articles`.
    ///
    /// # Example
    /// ```no_run
    /// use newsdesk_core::Article;
    /// use newsdesk_prompt::PromptBuilder;
    ///
    /// # fn example(articles: Vec<Article>) -> Result<(), Box<dyn std::error::Error>> {
    /// let builder = PromptBuilder::new("Daily Ledger")?;
    /// let messages = builder.build_messages("What happened to fuel prices?", &articles)?;
    /// assert_eq!(messages.len(), 3);
    /// # Ok(())
    /// # }
    /// ```
    pub fn build_messages(
        &self,
        question: &str,
        articles: &[Article],
    ) -> AppResult<Vec<ChatMessage>> {
        tracing::debug!("Building messages for {} articles", articles.len());

        let instructions = self.system_instructions()?;
        let context = render_context(&self.registry, articles)?;

        Ok(vec![
            ChatMessage::system(instructions),
            ChatMessage::system(format!(
                "Available {} articles:\n{}",
                self.publication, context
            )),
            ChatMessage::user(question),
        ])
    }
}
