//! Question answering over the article index.
//!
//! Retrieves articles for a question and asks the language model for a
//! sectioned analysis grounded in them.

pub mod answer;
pub mod types;

pub use answer::NewsDesk;
pub use types::{AnswerOutcome, NewsAnswer};
