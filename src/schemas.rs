use serde::{Deserialize, Serialize};

use crate::deserializers::de_option_bool_forgiving;

/// One web search hit, as handed from a search provider to the collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

impl SearchResult {
    /// Three-line block used inside the market data blob.
    pub fn render(&self) -> String {
        format!(
            "Title: {}\nLink: {}\nSnippet: {}\n",
            self.title, self.link, self.snippet
        )
    }
}

/// Query string for `GET /analyze/:sector`.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeQuery {
    #[serde(default, deserialize_with = "de_option_bool_forgiving")]
    pub download: Option<bool>,
}

impl AnalyzeQuery {
    pub fn wants_download(&self) -> bool {
        self.download.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub sector: String,
    pub session_usage_count: u64,
    pub report: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
