//! Prompt construction and answer parsing for Newsdesk.
//!
//! This crate is pure formatting, with no I/O:
//! - Context assembly: retrieved articles → numbered, truncated article blocks
//! - Message building: grounding rules + article context + user question
//! - Sectionizing: the model's `=== TITLE ===` reply → ordered sections

pub mod builder;
pub mod context;
pub mod sections;
pub mod types;

// Re-export main types
pub use builder::{PromptBuilder, SECTION_TITLES};
pub use context::{truncate_chars, ARTICLE_DELIMITER, CONTEXT_CONTENT_CHARS};
pub use sections::{parse_sections, SECTION_MARKER};
pub use types::{Section, StructuredAnswer};
