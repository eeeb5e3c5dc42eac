//! Newsdesk Core Library
//!
//! This crate provides the foundational utilities shared by every Newsdesk crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management (search backend, LLM provider, index field mapping)
//! - The `Article` record and date filter shared by the search and prompt crates

pub mod article;
pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use article::{Article, SearchFilter};
pub use config::{AppConfig, IndexFields, LlmSettings, SearchSettings, SortOrder};
pub use error::{AppError, AppResult};
