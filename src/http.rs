//! HTTP transport module for the trade opportunities API
//!
//! Axum-based server with static API-key authentication and per-address
//! rate limiting on the analysis route. Root and health are plain JSON.

use std::{
    any::Any,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
    time::Duration,
};

use axum::{
    Extension, Json, Router,
    extract::{ConnectInfo, Path, Query, Request, State},
    http::header,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as CorsAny, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    clients::{DuckDuckGoSearch, GeminiClient, ReportModel, SearchProvider},
    collector::MarketDataCollector,
    config::Config,
    error::{Result, TradeError, unavailable_response},
    generator::ReportGenerator,
    pipeline,
    rate_limit::{ClientRateLimit, WindowRateLimiter},
    schemas::{AnalyzeQuery, AnalyzeResponse, HealthResponse, MessageResponse},
    usage::UsageTracker,
};

pub const API_KEY_HEADER: &str = "x-api-key";
/// Principal recorded when no API key is configured.
pub const OPEN_ACCESS_PRINCIPAL: &str = "open-access";

/// Shared state for HTTP server
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub collector: MarketDataCollector,
    pub generator: ReportGenerator,
    pub usage: Arc<UsageTracker>,
    pub limiter: Arc<dyn ClientRateLimit>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        search: Arc<dyn SearchProvider>,
        model: Option<Arc<dyn ReportModel>>,
    ) -> Self {
        let collector = MarketDataCollector::new(
            search,
            config.search_max_results,
            config.market_region.clone(),
        );
        let generator = ReportGenerator::new(model, config.market_region.clone());
        Self {
            collector,
            generator,
            usage: Arc::new(UsageTracker::new()),
            limiter: Arc::new(WindowRateLimiter::new(config.rate_limit_per_minute)),
            config,
        }
    }

    /// Replace the per-address limiter, e.g. with one on a fake clock.
    pub fn with_rate_limiter(mut self, limiter: Arc<dyn ClientRateLimit>) -> Self {
        self.limiter = limiter;
        self
    }

    /// Wire the real DuckDuckGo and Gemini clients from configuration.
    pub fn from_config(config: Arc<Config>) -> anyhow::Result<Self> {
        let search: Arc<dyn SearchProvider> =
            Arc::new(DuckDuckGoSearch::new(config.search_timeout_ms)?);
        let model = match config.gemini_api_key.clone() {
            Some(key) => {
                let client = GeminiClient::new(
                    key,
                    config.gemini_model.clone(),
                    config.gemini_timeout_ms,
                )?;
                Some(Arc::new(client) as Arc<dyn ReportModel>)
            }
            None => None,
        };
        Ok(Self::new(config, search, model))
    }
}

/// Authenticated caller, inserted into request extensions by [`require_api_key`].
#[derive(Debug, Clone)]
pub struct ApiPrincipal(pub String);

pub async fn root_handler() -> impl IntoResponse {
    Json(MessageResponse {
        message: "Market Analysis API is running.".to_string(),
    })
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn analyze_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<ApiPrincipal>,
    Path(sector): Path<String>,
    Query(query): Query<AnalyzeQuery>,
) -> Result<Response> {
    let usage_count = state.usage.record(&principal.0).await;

    let analysis = pipeline::analyze_sector(&state.collector, &state.generator, &sector).await?;

    if query.wants_download() {
        return Ok(markdown_attachment(&sector, analysis.report.body));
    }

    Ok(Json(AnalyzeResponse {
        sector,
        session_usage_count: usage_count,
        report: analysis.report.body,
    })
    .into_response())
}

fn markdown_attachment(sector: &str, body: String) -> Response {
    let filename = report_filename(sector);
    (
        [
            (
                header::CONTENT_TYPE,
                "text/markdown; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        body,
    )
        .into_response()
}

/// `{sector}_report.md` with anything outside `[A-Za-z0-9_-]` replaced by `_`.
pub fn report_filename(sector: &str) -> String {
    let stem: String = sector
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = if stem.is_empty() {
        "sector".to_string()
    } else {
        stem
    };
    format!("{stem}_report.md")
}

/// Validate `X-API-Key` against the configured key.
pub async fn require_api_key(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let provided = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    let principal = match state.config.api_key.as_deref() {
        None => OPEN_ACCESS_PRINCIPAL.to_string(),
        Some(expected) if provided == Some(expected) => expected.to_string(),
        Some(_) => {
            tracing::warn!(
                "Rejected request to {} with invalid API key",
                req.uri().path()
            );
            return TradeError::Auth.into_response();
        }
    };

    req.extensions_mut().insert(ApiPrincipal(principal));
    next.run(req).await
}

/// Per-client-address rate limit.
pub async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let ip = client_ip(&req);
    match state.limiter.check(ip) {
        Ok(()) => next.run(req).await,
        Err(wait) => {
            tracing::warn!("Rate limit exceeded for {}", ip);
            TradeError::RateLimited {
                limit: state.limiter.limit(),
                retry_after_secs: retry_after_secs(wait),
            }
            .into_response()
        }
    }
}

/// Whole seconds to wait, rounded up, never zero.
fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}

/// Peer address when available, else the first `X-Forwarded-For` hop.
pub fn client_ip(req: &Request) -> IpAddr {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip();
    }
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|ip| ip.trim().parse().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(
        severity = "critical",
        "Internal Server Error: handler panicked: {}",
        detail
    );
    unavailable_response()
}

pub fn build_router(state: AppState) -> Router {
    let analyze = Router::new()
        .route("/analyze/:sector", get(analyze_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .merge(analyze)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(CorsAny)
                .allow_methods(CorsAny)
                .allow_headers(CorsAny),
        )
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_http_server(config: Arc<Config>) -> Result<()> {
    if config.open_access() {
        tracing::warn!("API_KEY is empty; /analyze is open to unauthenticated callers");
    }
    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set; /analyze will answer 400 until configured");
    }

    let state = AppState::from_config(config.clone())?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.http_bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind HTTP listener: {}", e))?;

    tracing::info!(
        "Starting {} v{} on {} (rate limit {}/minute)",
        config.project_name,
        config.version,
        config.http_bind,
        config.rate_limit_per_minute
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
