use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub collection: CollectionConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Where collected JSON lives on disk.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Root directory for every cache slot.
    #[serde(default = "default_cache_root")]
    pub root: PathBuf,
    /// Slot holding the manufacturer directory.
    #[serde(default = "default_directory_slot")]
    pub directory_slot: String,
    /// Sub-directory (relative to the root) holding one file per model-year.
    #[serde(default = "default_details_dir")]
    pub details_dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: default_cache_root(),
            directory_slot: default_directory_slot(),
            details_dir: default_details_dir(),
        }
    }
}

fn default_cache_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_directory_slot() -> String {
    "manufacturers".to_string()
}

fn default_details_dir() -> String {
    "data".to_string()
}

/// Generative model backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    /// Google Generative Language API.
    #[default]
    Gemini,
    /// Local Ollama instance.
    Ollama,
}

/// Model client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProvider,
    #[serde(default = "default_model")]
    pub model: String,
    /// Explicit API key. Takes precedence over `api_key_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is not set.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Custom API base URL (for proxies or self-hosted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Request timeout in seconds. Unset means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u32>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: default_model(),
            api_key: None,
            api_key_env: default_api_key_env(),
            api_base: None,
            timeout_secs: None,
            max_tokens: default_max_tokens(),
            temperature: 0.0,
        }
    }
}

impl LlmConfig {
    /// The explicit key, else the value of `api_key_env`.
    ///
    /// A missing key is not an error here; the service rejects the query.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.is_empty())
    }
}

fn default_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

fn default_api_key_env() -> String {
    "GENAI_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    8192
}

/// What a stage does when one unit of work fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the whole run. Restarting resumes from the cache.
    #[default]
    Abort,
    /// Log, leave the unit uncached and move on. The next run retries it.
    Skip,
}

/// Collection behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Market named in the prompts.
    #[serde(default = "default_market")]
    pub market: String,
    /// First model year asked for. Unset means the current calendar year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_year: Option<i32>,
    /// Ignore existing cache slots and query again.
    #[serde(default)]
    pub force_refresh: bool,
    #[serde(default)]
    pub catalog_failure: FailurePolicy,
    #[serde(default)]
    pub detail_failure: FailurePolicy,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            market: default_market(),
            base_year: None,
            force_refresh: false,
            catalog_failure: FailurePolicy::Abort,
            detail_failure: FailurePolicy::Abort,
        }
    }
}

impl CollectionConfig {
    pub fn effective_base_year(&self) -> i32 {
        use chrono::Datelike;

        self.base_year.unwrap_or_else(|| chrono::Local::now().year())
    }
}

fn default_market() -> String {
    "north american".to_string()
}

/// Run metrics export.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MetricsConfig {
    /// Prometheus textfile written at the end of each run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textfile: Option<PathBuf>,
}
