//! Configuration management for Newsdesk.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Defaults matching the production news index
//! - Config files (.newsdesk/config.yaml)
//! - Environment variables (a `.env` file is loaded by the binary beforehand)
//! - Command-line flags
//!
//! Later sources override earlier ones.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers the LLM factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 2] = ["openai", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .newsdesk/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Search backend settings
    pub search: SearchSettings,

    /// Language-model settings
    pub llm: LlmSettings,

    /// Publication name used in the assistant instructions
    pub publication: String,

    /// Log level override
    pub log_level: Option<String>,

    /// Disable colored output
    pub no_color: bool,
}

/// Final ordering applied to search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Most recent publication date first; relevance is kept for display only
    #[default]
    Date,
    /// Backend relevance score, highest first
    Relevance,
}

impl SortOrder {
    /// Parse a sort order from a CLI or environment string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "date" | "recent" => Some(Self::Date),
            "relevance" | "score" => Some(Self::Relevance),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Relevance => "relevance",
        }
    }
}

/// Mapping from article attributes to document fields in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexFields {
    pub title: String,
    pub content: String,
    pub category: String,
    pub date: String,
    pub link: String,
    pub id: String,
    pub image: String,
}

impl Default for IndexFields {
    fn default() -> Self {
        Self {
            title: "post_title".to_string(),
            content: "post_content".to_string(),
            category: "Rubrique".to_string(),
            date: "post_date".to_string(),
            link: "lien1".to_string(),
            id: "id".to_string(),
            image: "img".to_string(),
        }
    }
}

/// Search backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchSettings {
    /// Base URL of the Elasticsearch cluster
    pub endpoint: Option<String>,

    /// Index holding the articles
    pub index: Option<String>,

    /// Basic-auth user name
    pub username: Option<String>,

    /// Basic-auth password
    #[serde(skip_serializing)]
    pub password: Option<String>,

    /// Verify TLS certificates
    pub verify_certs: bool,

    /// Connection timeout in seconds
    pub timeout_secs: u64,

    /// Per-search request timeout in seconds
    pub request_timeout_secs: u64,

    /// Connection-level retries on timeouts and connection errors
    pub max_retries: u32,

    /// Default number of articles to retrieve
    pub result_limit: usize,

    /// Final ordering of results
    pub sort: SortOrder,

    /// Document field names
    pub fields: IndexFields,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            index: None,
            username: None,
            password: None,
            verify_certs: false,
            timeout_secs: 60,
            request_timeout_secs: 30,
            max_retries: 5,
            result_limit: 15,
            sort: SortOrder::Date,
            fields: IndexFields::default(),
        }
    }
}

/// Language-model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmSettings {
    /// Provider name ("openai", "ollama")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Optional custom endpoint
    pub endpoint: Option<String>,

    /// API key (never written back to YAML)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum completion length in tokens
    pub max_tokens: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            endpoint: None,
            api_key: None,
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    search: Option<SearchSettings>,
    llm: Option<LlmSettings>,
    publication: Option<String>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            search: SearchSettings::default(),
            llm: LlmSettings::default(),
            publication: "the newsroom".to_string(),
            log_level: None,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and environment variables.
    ///
    /// Environment variables:
    /// - `NEWSDESK_WORKSPACE`: Override workspace path
    /// - `NEWSDESK_CONFIG`: Path to config file
    /// - `ELK_ENDPOINT`, `ELK_INDEX`, `ELK_USERNAME`, `ELK_PASSWORD`: Search backend
    /// - `NEWSDESK_SORT`: `date` or `relevance`
    /// - `NEWSDESK_PROVIDER`, `NEWSDESK_MODEL`: LLM provider and model
    /// - `NEWSDESK_API_KEY` or `OPENAI_API_KEY`: LLM API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use newsdesk_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Index: {:?}", config.search.index);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Load configuration with an explicit workspace or config file.
    ///
    /// Explicit paths (usually from CLI flags) win over `NEWSDESK_WORKSPACE`
    /// and `NEWSDESK_CONFIG`. An explicit config file that does not exist is
    /// an error; the default `.newsdesk/config.yaml` is optional.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let env = |key: &str| std::env::var(key).ok();
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| env("NEWSDESK_WORKSPACE").map(PathBuf::from)) {
            config.workspace = workspace;
        }

        if let Some(config_file) = config_file.or_else(|| env("NEWSDESK_CONFIG").map(PathBuf::from)) {
            if !config_file.exists() {
                return Err(AppError::Config(format!(
                    "Config file does not exist: {:?}",
                    config_file
                )));
            }
            config.config_file = Some(config_file);
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.newsdesk_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        config.apply_env(env);

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        tracing::debug!("Merging config file {:?}", path);

        let mut result = self.clone();

        if let Some(search) = config_file.search {
            result.search = search;
        }

        if let Some(llm) = config_file.llm {
            result.llm = llm;
        }

        if let Some(publication) = config_file.publication {
            result.publication = publication;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply environment overrides through a lookup function.
    fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = env("ELK_ENDPOINT") {
            self.search.endpoint = Some(endpoint);
        }
        if let Some(index) = env("ELK_INDEX") {
            self.search.index = Some(index);
        }
        if let Some(username) = env("ELK_USERNAME") {
            self.search.username = Some(username);
        }
        if let Some(password) = env("ELK_PASSWORD") {
            self.search.password = Some(password);
        }
        if let Some(sort) = env("NEWSDESK_SORT").and_then(|s| SortOrder::parse(&s)) {
            self.search.sort = sort;
        }

        if let Some(provider) = env("NEWSDESK_PROVIDER") {
            self.llm.provider = provider;
        }
        if let Some(model) = env("NEWSDESK_MODEL") {
            self.llm.model = model;
        }
        if let Some(key) = env("NEWSDESK_API_KEY").or_else(|| env("OPENAI_API_KEY")) {
            self.llm.api_key = Some(key);
        }

        if let Some(level) = env("RUST_LOG") {
            self.log_level = Some(level);
        }
        if env("NO_COLOR").is_some() {
            self.no_color = true;
        }
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.llm.provider = provider;
        }

        if let Some(model) = model {
            self.llm.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        // Verbose mode implies debug logging
        if verbose && self.log_level.is_none() {
            self.log_level = Some("debug".to_string());
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .newsdesk directory.
    pub fn newsdesk_dir(&self) -> PathBuf {
        self.workspace.join(".newsdesk")
    }

    /// Check that the search backend is configured.
    pub fn validate_search(&self) -> AppResult<()> {
        if self.search.endpoint.as_deref().map_or(true, str::is_empty) {
            return Err(AppError::Config(
                "Search endpoint not configured (set ELK_ENDPOINT or search.endpoint)".to_string(),
            ));
        }

        if self.search.index.as_deref().map_or(true, str::is_empty) {
            return Err(AppError::Config(
                "Search index not configured (set ELK_INDEX or search.index)".to_string(),
            ));
        }

        if self.search.result_limit == 0 {
            return Err(AppError::Config(
                "search.resultLimit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate configuration for the search backend and the active provider.
    pub fn validate(&self) -> AppResult<()> {
        self.validate_search()?;

        let provider = self.llm.provider.to_lowercase();
        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.llm.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if provider == "openai" && self.llm.api_key.is_none() {
            return Err(AppError::Config(
                "API key not found (set OPENAI_API_KEY or NEWSDESK_API_KEY)".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn configured() -> AppConfig {
        let mut config = AppConfig::default();
        config.search.endpoint = Some("http://localhost:9200".to_string());
        config.search.index = Some("articles".to_string());
        config.llm.api_key = Some("sk-test".to_string());
        config
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
        assert_eq!(config.llm.temperature, 0.7);
        assert_eq!(config.llm.max_tokens, 2000);
        assert_eq!(config.search.result_limit, 15);
        assert_eq!(config.search.sort, SortOrder::Date);
        assert_eq!(config.search.fields.title, "post_title");
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ELK_ENDPOINT", "https://es.example.com:9200"),
            ("ELK_INDEX", "news"),
            ("ELK_USERNAME", "reader"),
            ("ELK_PASSWORD", "secret"),
            ("OPENAI_API_KEY", "sk-abc"),
            ("NEWSDESK_SORT", "relevance"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(
            config.search.endpoint.as_deref(),
            Some("https://es.example.com:9200")
        );
        assert_eq!(config.search.index.as_deref(), Some("news"));
        assert_eq!(config.search.username.as_deref(), Some("reader"));
        assert_eq!(config.search.password.as_deref(), Some("secret"));
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-abc"));
        assert_eq!(config.search.sort, SortOrder::Relevance);
    }

    #[test]
    fn test_newsdesk_api_key_wins_over_openai_key() {
        let mut config = AppConfig::default();
        config.apply_env(|key| match key {
            "NEWSDESK_API_KEY" => Some("primary".to_string()),
            "OPENAI_API_KEY" => Some("fallback".to_string()),
            _ => None,
        });
        assert_eq!(config.llm.api_key.as_deref(), Some("primary"));
    }

    #[test]
    fn test_merge_yaml_partial_sections() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
search:
  endpoint: http://search:9200
  index: articles
  resultLimit: 10
  sort: relevance
  fields:
    title: headline
llm:
  provider: ollama
  model: llama3.2
publication: The Daily Ledger
logging:
  level: debug
  color: false
"#,
        )
        .unwrap();

        let merged = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(merged.search.endpoint.as_deref(), Some("http://search:9200"));
        assert_eq!(merged.search.result_limit, 10);
        assert_eq!(merged.search.sort, SortOrder::Relevance);
        assert_eq!(merged.search.fields.title, "headline");
        // Unlisted fields keep their defaults
        assert_eq!(merged.search.fields.content, "post_content");
        assert_eq!(merged.search.request_timeout_secs, 30);
        assert_eq!(merged.llm.provider, "ollama");
        assert_eq!(merged.llm.max_tokens, 2000);
        assert_eq!(merged.publication, "The Daily Ledger");
        assert_eq!(merged.log_level.as_deref(), Some("debug"));
        assert!(merged.no_color);
    }

    #[test]
    fn test_merge_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "search: [not, a, map").unwrap();
        assert!(AppConfig::default().merge_yaml(&path).is_err());
    }

    #[test]
    fn test_load_from_workspace_config() {
        let temp_dir = TempDir::new().unwrap();
        let newsdesk_dir = temp_dir.path().join(".newsdesk");
        std::fs::create_dir_all(&newsdesk_dir).unwrap();
        std::fs::write(newsdesk_dir.join("config.yaml"), "publication: Harbor Times\n").unwrap();

        let config = AppConfig::load_from(Some(temp_dir.path().to_path_buf()), None).unwrap();
        assert_eq!(config.publication, "Harbor Times");
        assert_eq!(config.newsdesk_dir(), newsdesk_dir);
        assert_eq!(config.config_file, None);
    }

    #[test]
    fn test_load_from_missing_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = AppConfig::load_from(
            Some(temp_dir.path().to_path_buf()),
            Some(temp_dir.path().join("absent.yaml")),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            None,
            Some("ollama".to_string()),
            Some("mistral".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.llm.provider, "ollama");
        assert_eq!(overridden.llm.model, "mistral");
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_verbose_keeps_explicit_log_level() {
        let overridden = AppConfig::default().with_overrides(
            None,
            None,
            None,
            None,
            Some("warn".to_string()),
            true,
            false,
        );
        assert_eq!(overridden.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn test_validate_requires_search_endpoint() {
        let mut config = configured();
        config.search.endpoint = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = configured();
        config.llm.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_openai_requires_key() {
        let mut config = configured();
        config.llm.api_key = None;
        assert!(config.validate().is_err());

        config.llm.provider = "ollama".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse("date"), Some(SortOrder::Date));
        assert_eq!(SortOrder::parse("Relevance"), Some(SortOrder::Relevance));
        assert_eq!(SortOrder::parse("random"), None);
    }
}
