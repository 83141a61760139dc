use async_trait::async_trait;
use thiserror::Error;

use crate::schemas::SearchResult;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Http(String),
    #[error("search provider returned {status}")]
    Status { status: u16 },
    #[error("could not parse search results: {0}")]
    Parse(String),
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Http(String),
    #[error("model API error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("model returned no text")]
    EmptyResponse,
    #[error("could not parse model response: {0}")]
    Parse(String),
}

/// Web search backend used by the market data collector.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError>;

    fn name(&self) -> &'static str;
}

/// Text generation backend used by the report generator.
#[async_trait]
pub trait ReportModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;

    fn model_name(&self) -> &str;
}
