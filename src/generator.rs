//! Report generation over the configured model, with a template fallback.

use std::sync::Arc;

use crate::clients::traits::ReportModel;
use crate::error::{Result, TradeError};
use crate::prompts;

pub const MISSING_MODEL_KEY_MESSAGE: &str =
    "GEMINI_API_KEY not found. Analysis cannot be performed.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSource {
    Model,
    Fallback { reason: String },
    InsufficientData,
}

/// A markdown report. `body` is never empty.
#[derive(Debug, Clone)]
pub struct Report {
    pub body: String,
    pub source: ReportSource,
}

impl Report {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, ReportSource::Fallback { .. })
    }
}

#[derive(Clone)]
pub struct ReportGenerator {
    model: Option<Arc<dyn ReportModel>>,
    region: String,
}

impl ReportGenerator {
    /// `model` is `None` when no model credential is configured.
    pub fn new(model: Option<Arc<dyn ReportModel>>, region: String) -> Self {
        Self { model, region }
    }

    /// Produce a report for `sector` from the collected `market_data`.
    ///
    /// Only a missing model credential is an error; any model failure yields
    /// the fallback report.
    pub async fn generate_report(&self, sector: &str, market_data: &str) -> Result<Report> {
        let Some(model) = self.model.as_ref() else {
            tracing::error!("GEMINI_API_KEY missing");
            return Err(TradeError::Config {
                message: MISSING_MODEL_KEY_MESSAGE.to_string(),
            });
        };

        if market_data.is_empty() {
            tracing::warn!("Insufficient data for analysis for sector: {}", sector);
            return Ok(Report {
                body: prompts::insufficient_data_notice(sector),
                source: ReportSource::InsufficientData,
            });
        }

        tracing::info!(
            "Starting {} analysis for sector: {}",
            model.model_name(),
            sector
        );
        let prompt = prompts::analysis_prompt(sector, &self.region, market_data);

        match model.generate(&prompt).await {
            Ok(body) => {
                tracing::info!("Model analysis completed successfully");
                Ok(Report {
                    body,
                    source: ReportSource::Model,
                })
            }
            Err(e) => {
                tracing::error!("Error during AI analysis: {}", e);
                tracing::warn!("Returning fallback report for {}", sector);
                let reason = e.to_string();
                Ok(Report {
                    body: prompts::fallback_report(sector, &self.region, &reason),
                    source: ReportSource::Fallback { reason },
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::traits::ModelError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoModel {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ReportModel for EchoModel {
        async fn generate(&self, prompt: &str) -> std::result::Result<String, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ModelError::Status {
                    status: 429,
                    body: "quota".into(),
                })
            } else {
                Ok(format!("MODEL:{}", prompt.len()))
            }
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    fn generator(fail: bool) -> (ReportGenerator, Arc<EchoModel>) {
        let model = Arc::new(EchoModel {
            calls: AtomicUsize::new(0),
            fail,
        });
        (
            ReportGenerator::new(Some(model.clone()), "India".into()),
            model,
        )
    }

    #[tokio::test]
    async fn test_missing_model_is_config_error() {
        let g = ReportGenerator::new(None, "India".into());
        let err = g.generate_report("textiles", "data").await.unwrap_err();
        assert!(matches!(err, TradeError::Config { .. }));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
        // Independent of inputs
        assert!(g.generate_report("", "").await.is_err());
    }

    #[tokio::test]
    async fn test_model_text_returned_verbatim() {
        let (g, model) = generator(false);
        let report = g.generate_report("tea", "blob").await.unwrap();
        assert_eq!(report.source, ReportSource::Model);
        assert!(report.body.starts_with("MODEL:"));
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_model_failure_falls_back() {
        let (g, model) = generator(true);
        let report = g.generate_report("textiles", "blob").await.unwrap();
        assert!(report.is_fallback());
        assert!(prompts::has_report_sections(&report.body));
        assert!(report.body.contains("model API error 429: quota"));
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_data_skips_model() {
        let (g, model) = generator(false);
        let report = g.generate_report("tea", "").await.unwrap();
        assert_eq!(report.source, ReportSource::InsufficientData);
        assert_eq!(
            report.body,
            "No sufficient data found for sector 'tea' to perform analysis."
        );
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }
}
