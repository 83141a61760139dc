use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use trade_opportunities::{config::Config, http::AppState, pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "market-report",
    about = "Generate a trade opportunities report for one sector without the HTTP server"
)]
struct Args {
    /// Industry sector to analyze (free text)
    sector: String,

    /// Write the markdown report to this file instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Also print the collected market data
    #[arg(long)]
    show_data: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Arc::new(Config::load()?);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&config.log_level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let state = AppState::from_config(config)?;
    let analysis =
        pipeline::analyze_sector(&state.collector, &state.generator, &args.sector).await?;

    if args.show_data {
        eprintln!("--- market data ---\n{}\n---", analysis.market_data.as_str());
    }
    if analysis.report.is_fallback() {
        eprintln!("warning: model unavailable, wrote fallback report");
    }

    match args.output {
        Some(path) => {
            std::fs::write(&path, &analysis.report.body)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            eprintln!("Report written to {}", path.display());
        }
        None => println!("{}", analysis.report.body),
    }

    Ok(())
}
