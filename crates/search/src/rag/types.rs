//! Pipeline result types.

use newsdesk_core::Article;
use newsdesk_prompt::StructuredAnswer;
use serde::Serialize;

/// Shown when the question is blank.
pub const EMPTY_QUESTION_MESSAGE: &str = "Please enter a question.";

/// Shown when the search returned nothing.
pub const NO_ARTICLES_MESSAGE: &str = "Sorry, no relevant articles were found for your question.";

/// Shown when the search backend cannot be reached.
pub const SEARCH_UNAVAILABLE_MESSAGE: &str = "The connection to the article index is not available.";

/// Prefix for any other search failure.
pub const SEARCH_FAILED_MESSAGE: &str = "Error while searching the article index";

/// Shown instead of an answer when generation fails.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Sorry, an error occurred while generating the answer.";

/// How a question was resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// Blank question; nothing was searched
    EmptyQuestion,

    /// The search failed; the model was not invoked
    SearchError { message: String },

    /// The search succeeded with zero articles; the model was not invoked
    NoArticles,

    /// The model call failed
    GenerationError { message: String },

    /// The model answered
    Answered {
        answer: StructuredAnswer,
        #[serde(skip_serializing)]
        raw: String,
    },
}

impl AnswerOutcome {
    /// User-facing message for the non-answer outcomes.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::EmptyQuestion => Some(EMPTY_QUESTION_MESSAGE),
            Self::NoArticles => Some(NO_ARTICLES_MESSAGE),
            Self::SearchError { message } | Self::GenerationError { message } => Some(message),
            Self::Answered { .. } => None,
        }
    }
}

/// Everything produced for one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsAnswer {
    /// Question as asked
    pub question: String,

    /// Articles the answer is grounded in, in context order
    pub articles: Vec<Article>,

    #[serde(flatten)]
    pub outcome: AnswerOutcome,
}

impl NewsAnswer {
    pub fn new(question: impl Into<String>, articles: Vec<Article>, outcome: AnswerOutcome) -> Self {
        Self {
            question: question.into(),
            articles,
            outcome,
        }
    }

    /// The parsed answer, when there is one.
    pub fn structured(&self) -> Option<&StructuredAnswer> {
        match &self.outcome {
            AnswerOutcome::Answered { answer, .. } => Some(answer),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsdesk_prompt::Section;

    #[test]
    fn test_outcome_messages() {
        assert_eq!(
            AnswerOutcome::NoArticles.message(),
            Some(NO_ARTICLES_MESSAGE)
        );
        let outcome = AnswerOutcome::SearchError {
            message: SEARCH_UNAVAILABLE_MESSAGE.to_string(),
        };
        assert_eq!(outcome.message(), Some(SEARCH_UNAVAILABLE_MESSAGE));
    }

    #[test]
    fn test_answered_has_no_message() {
        let outcome = AnswerOutcome::Answered {
            answer: StructuredAnswer::default(),
            raw: String::new(),
        };
        assert!(outcome.message().is_none());
    }

    #[test]
    fn test_json_shape() {
        let answer = StructuredAnswer {
            sections: vec![Section::new("GLOBAL SYNTHESIS", "Prices rose.")],
            malformed: Vec::new(),
        };
        let response = NewsAnswer::new(
            "fuel prices",
            Vec::new(),
            AnswerOutcome::Answered {
                answer,
                raw: "=== GLOBAL SYNTHESIS ===\nPrices rose.".to_string(),
            },
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "answered");
        assert_eq!(json["question"], "fuel prices");
        assert_eq!(json["answer"]["sections"][0]["title"], "GLOBAL SYNTHESIS");
        assert!(json.get("raw").is_none());

        let json = serde_json::to_value(NewsAnswer::new(
            "q",
            Vec::new(),
            AnswerOutcome::GenerationError {
                message: GENERATION_FAILED_MESSAGE.to_string(),
            },
        ))
        .unwrap();
        assert_eq!(json["status"], "generation_error");
        assert_eq!(json["message"], GENERATION_FAILED_MESSAGE);
    }
}
