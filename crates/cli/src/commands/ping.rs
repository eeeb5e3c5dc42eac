//! Ping command handler.

use clap::Args;
use newsdesk_core::{config::AppConfig, AppResult};
use newsdesk_search::{ElasticsearchClient, SearchBackend};

/// Check the connection to the search backend
#[derive(Args, Debug)]
pub struct PingCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PingCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        config.validate_search()?;

        let client = ElasticsearchClient::from_settings(&config.search)?;
        let result = client.ping().await;

        let endpoint = config.search.endpoint.as_deref().unwrap_or_default();
        let index = config.search.index.as_deref().unwrap_or_default();

        if self.json {
            let output = serde_json::json!({
                "endpoint": endpoint,
                "index": index,
                "reachable": result.is_ok(),
                "error": result.as_ref().err().map(|e| e.to_string()),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            match &result {
                Ok(()) => println!("Search backend reachable at {} (index: {})", endpoint, index),
                Err(e) => println!("Search backend unreachable at {}: {}", endpoint, e),
            }
        }

        result
    }
}
