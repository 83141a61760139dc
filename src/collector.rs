//! Market data collection: web search snippets rendered into a single text blob.

use std::sync::Arc;

use crate::clients::traits::SearchProvider;

/// Year embedded in search queries and degraded-data notes.
pub const SEARCH_YEAR: u16 = 2024;
pub const RESULT_SEPARATOR: &str = "\n---\n";

/// Outcome of a collection run. The text is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketData {
    /// Rendered search results joined by [`RESULT_SEPARATOR`].
    Results { text: String, count: usize },
    /// The provider answered but had nothing for this sector.
    NoResults { text: String },
    /// The provider failed; `text` asks the model to use general knowledge.
    Unavailable { text: String, reason: String },
}

impl MarketData {
    pub fn as_str(&self) -> &str {
        match self {
            MarketData::Results { text, .. }
            | MarketData::NoResults { text }
            | MarketData::Unavailable { text, .. } => text,
        }
    }

    pub fn is_degraded(&self) -> bool {
        !matches!(self, MarketData::Results { .. })
    }
}

pub fn search_query(sector: &str, region: &str) -> String {
    format!("current market trends trade opportunities {sector} sector {region} {SEARCH_YEAR}")
}

pub fn no_results_note(sector: &str) -> String {
    format!(
        "Note: No specific recent news found for {sector}. Please analyze based on general market knowledge."
    )
}

pub fn fetch_failed_note(sector: &str, region: &str, reason: &str) -> String {
    format!(
        "SYSTEM NOTE: Real-time market data collection failed due to external API connectivity issues ({reason}). \
         Please provide an analysis of the '{sector}' sector in {region} based on your internal training data up to {SEARCH_YEAR}."
    )
}

#[derive(Clone)]
pub struct MarketDataCollector {
    provider: Arc<dyn SearchProvider>,
    max_results: usize,
    region: String,
}

impl MarketDataCollector {
    pub fn new(provider: Arc<dyn SearchProvider>, max_results: usize, region: String) -> Self {
        Self {
            provider,
            max_results,
            region,
        }
    }

    /// Search for recent market coverage of `sector`. Never fails: empty or
    /// failed searches degrade to a note for the model.
    pub async fn fetch_market_data(&self, sector: &str) -> MarketData {
        tracing::info!("Fetching market data for sector: {}", sector);
        let query = search_query(sector, &self.region);

        match self.provider.search(&query, self.max_results).await {
            Ok(results) if results.is_empty() => {
                tracing::warn!("No results found for sector: {}", sector);
                MarketData::NoResults {
                    text: no_results_note(sector),
                }
            }
            Ok(results) => {
                let count = results.len().min(self.max_results);
                let text = results
                    .iter()
                    .take(self.max_results)
                    .map(|r| r.render())
                    .collect::<Vec<_>>()
                    .join(RESULT_SEPARATOR);
                tracing::info!(
                    "Successfully retrieved {} search results for {}",
                    count,
                    sector
                );
                MarketData::Results { text, count }
            }
            Err(e) => {
                tracing::error!(
                    "Error fetching data from {}: {}",
                    self.provider.name(),
                    e
                );
                let reason = e.to_string();
                MarketData::Unavailable {
                    text: fetch_failed_note(sector, &self.region, &reason),
                    reason,
                }
            }
        }
    }
}
