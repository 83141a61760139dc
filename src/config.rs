use std::net::SocketAddr;

/// Value used when `API_KEY` is not present in the environment at all.
pub const DEFAULT_API_KEY: &str = "secret-token";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Process configuration, built once at startup and shared as `Arc<Config>`.
#[derive(Debug, Clone)]
pub struct Config {
    pub project_name: String,
    pub version: String,
    /// Credential for the generative model. `None` disables report generation.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_timeout_ms: u64,
    /// Static key expected in `X-API-Key`. `None` means open access.
    pub api_key: Option<String>,
    pub http_bind: SocketAddr,
    pub rate_limit_per_minute: u32,
    pub search_max_results: usize,
    pub search_timeout_ms: u64,
    pub market_region: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_name: "Trade Opportunities API".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_timeout_ms: 60_000,
            api_key: Some(DEFAULT_API_KEY.to_string()),
            http_bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
            rate_limit_per_minute: 5,
            search_max_results: 5,
            search_timeout_ms: 10_000,
            market_region: "India".to_string(),
            log_level: "trade_opportunities=info,tower_http=info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `.env` (if present) and the process environment.
    ///
    /// Resolution order for the env file:
    /// 1) `TRADE_ENV_FILE` if set
    /// 2) `./.env`
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(env_path) = std::env::var("TRADE_ENV_FILE") {
            dotenvy::from_path(&env_path)
                .map_err(|e| anyhow::anyhow!("Failed to load env file {}: {}", env_path, e))?;
        } else {
            let _ = dotenvy::dotenv();
        }

        Ok(Self::from_lookup(|key| std::env::var(key).ok()))
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(name) = lookup("PROJECT_NAME").filter(|v| !v.trim().is_empty()) {
            cfg.project_name = name;
        }
        if let Some(version) = lookup("PROJECT_VERSION").filter(|v| !v.trim().is_empty()) {
            cfg.version = version;
        }

        cfg.gemini_api_key = lookup("GEMINI_API_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        if let Some(model) = lookup("GEMINI_MODEL").filter(|v| !v.trim().is_empty()) {
            cfg.gemini_model = model.trim().to_string();
        }
        cfg.gemini_timeout_ms = parse_or(&lookup, "GEMINI_TIMEOUT_MS", cfg.gemini_timeout_ms);

        // Unset keeps the default key; explicitly empty opens the API.
        if let Some(key) = lookup("API_KEY") {
            let key = key.trim().to_string();
            cfg.api_key = if key.is_empty() { None } else { Some(key) };
        }

        if let Some(v) = lookup("HTTP_BIND") {
            match v.parse::<SocketAddr>() {
                Ok(bind) => cfg.http_bind = bind,
                Err(e) => tracing::warn!("Ignoring invalid HTTP_BIND '{}': {}", v, e),
            }
        }

        cfg.rate_limit_per_minute =
            parse_or(&lookup, "RATE_LIMIT_PER_MINUTE", cfg.rate_limit_per_minute).max(1);

        let max_results = parse_or(&lookup, "SEARCH_MAX_RESULTS", cfg.search_max_results);
        if !(1..=25).contains(&max_results) {
            tracing::warn!(
                "SEARCH_MAX_RESULTS {} outside 1..=25, clamping",
                max_results
            );
        }
        cfg.search_max_results = max_results.clamp(1, 25);
        cfg.search_timeout_ms = parse_or(&lookup, "SEARCH_TIMEOUT_MS", cfg.search_timeout_ms);

        if let Some(region) = lookup("MARKET_REGION").filter(|v| !v.trim().is_empty()) {
            cfg.market_region = region.trim().to_string();
        }
        if let Some(level) = lookup("RUST_LOG").filter(|v| !v.trim().is_empty()) {
            cfg.log_level = level;
        }

        cfg
    }

    pub fn open_access(&self) -> bool {
        self.api_key.is_none()
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {} value '{}'", key, raw);
            default
        }),
        None => default,
    }
}
