//! Collector → generator sequencing shared by the HTTP handler and the CLI.

use crate::collector::{MarketData, MarketDataCollector};
use crate::error::Result;
use crate::generator::{Report, ReportGenerator};

#[derive(Debug, Clone)]
pub struct Analysis {
    pub market_data: MarketData,
    pub report: Report,
}

/// Collect market data for `sector`, then generate the report from it.
///
/// The generator runs even when collection degraded to a placeholder note.
pub async fn analyze_sector(
    collector: &MarketDataCollector,
    generator: &ReportGenerator,
    sector: &str,
) -> Result<Analysis> {
    let market_data = collector.fetch_market_data(sector).await;
    if market_data.is_degraded() {
        tracing::debug!("Continuing {} analysis with degraded market data", sector);
    }
    let report = generator
        .generate_report(sector, market_data.as_str())
        .await?;
    Ok(Analysis {
        market_data,
        report,
    })
}
