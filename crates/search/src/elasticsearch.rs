//! Elasticsearch backend over its REST API.
//!
//! The client is created once at startup and shared. Connection-level retry
//! lives here, configured from settings; callers never retry themselves.

use crate::backend::SearchBackend;
use crate::types::{SearchHit, SearchRequest};
use newsdesk_core::{AppError, AppResult, SearchSettings};
use serde::Deserialize;
use std::time::Duration;

/// Base delay between retries, doubled on every attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

/// Search response envelope (only the parts we read).
#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

/// Elasticsearch client.
pub struct ElasticsearchClient {
    /// Base URL, without trailing slash
    endpoint: String,

    /// Index holding the articles
    index: String,

    username: Option<String>,
    password: Option<String>,

    /// Attempts after the first one, on timeouts and connection errors
    max_retries: u32,

    /// HTTP client
    client: reqwest::Client,
}

impl ElasticsearchClient {
    /// Build a client from settings without contacting the cluster.
    pub fn from_settings(settings: &SearchSettings) -> AppResult<Self> {
        let endpoint = settings
            .endpoint
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AppError::SearchUnavailable("no search endpoint configured".into()))?;
        let index = settings
            .index
            .as_deref()
            .filter(|i| !i.is_empty())
            .ok_or_else(|| AppError::SearchUnavailable("no search index configured".into()))?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(settings.timeout_secs))
            .timeout(Duration::from_secs(settings.timeout_secs))
            .danger_accept_invalid_certs(!settings.verify_certs)
            .build()
            .map_err(|e| {
                AppError::SearchUnavailable(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            index: index.to_string(),
            username: settings.username.clone(),
            password: settings.password.clone(),
            max_retries: settings.max_retries,
            client,
        })
    }

    /// Build a client and verify the cluster answers.
    pub async fn connect(settings: &SearchSettings) -> AppResult<Self> {
        let client = Self::from_settings(settings)?;
        client.ping().await?;
        tracing::info!("Connected to Elasticsearch at {}", client.endpoint);
        Ok(client)
    }

    fn search_url(&self) -> String {
        format!("{}/{}/_search", self.endpoint, self.index)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.username {
            Some(user) => builder.basic_auth(user, self.password.as_deref()),
            None => builder,
        }
    }

    /// Send a request, retrying on timeouts and connection errors.
    async fn send_with_retry<F>(&self, make_request: F) -> Result<reqwest::Response, reqwest::Error>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            match self.authorize(make_request()).send().await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.max_retries && (e.is_timeout() || e.is_connect()) => {
                    attempt += 1;
                    let delay = RETRY_BASE_DELAY * 2u32.saturating_pow(attempt - 1);
                    tracing::warn!(
                        "Elasticsearch request failed ({}), retry {}/{} in {:?}",
                        e,
                        attempt,
                        self.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// A transport fault during a search, connection errors included.
fn search_transport_error(err: reqwest::Error) -> AppError {
    AppError::SearchFailed(format!("Elasticsearch request failed: {}", err))
}

fn parse_hits(body: &str) -> AppResult<Vec<SearchHit>> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| AppError::SearchFailed(format!("Invalid search response: {}", e)))?;
    Ok(response.hits.hits)
}

#[async_trait::async_trait]
impl SearchBackend for ElasticsearchClient {
    fn name(&self) -> &str {
        "elasticsearch"
    }

    async fn ping(&self) -> AppResult<()> {
        let response = self
            .send_with_retry(|| self.client.head(&self.endpoint))
            .await
            .map_err(|e| AppError::SearchUnavailable(format!("Cannot reach Elasticsearch: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::SearchUnavailable(format!(
                "Elasticsearch ping returned {}",
                response.status()
            )));
        }

        Ok(())
    }

    async fn search(&self, request: &SearchRequest) -> AppResult<Vec<SearchHit>> {
        let url = self.search_url();
        tracing::debug!("POST {} {}", url, request.body);

        let response = self
            .send_with_retry(|| {
                self.client
                    .post(&url)
                    .timeout(request.timeout)
                    .json(&request.body)
            })
            .await
            .map_err(search_transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(search_transport_error)?;

        if !status.is_success() {
            tracing::error!("Elasticsearch returned {}: {}", status, text);
            return Err(AppError::SearchFailed(format!(
                "Elasticsearch returned {}",
                status
            )));
        }

        parse_hits(&text)
    }
}
