pub mod duckduckgo;
pub mod gemini;
pub mod traits;

pub use duckduckgo::DuckDuckGoSearch;
pub use gemini::GeminiClient;
pub use traits::{ModelError, ReportModel, SearchError, SearchProvider};
