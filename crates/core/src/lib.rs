pub mod cache;
pub mod collector;
pub mod config;
pub mod cost;
pub mod extract;
pub mod llm;
pub mod metrics;
pub mod testing;
pub mod vehicle;

pub use cache::{CacheError, CacheStore, JsonFileStore};
pub use collector::{CollectionError, CollectionReport, Collector, PipelineError, Stage};
pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, CacheConfig,
    CollectionConfig, Config, ConfigError, FailurePolicy, LlmConfig, LlmProvider, MetricsConfig,
};
pub use cost::{calculate_vehicle_cost, CostBreakdown, CostComputationError};
pub use extract::{extract_json, ExtractionError};
pub use llm::{create_llm_client, GeminiClient, LlmClient, LlmError, OllamaClient};
pub use vehicle::{
    CacheKey, CatalogEntry, FlexNumber, FlexText, ManufacturerDirectory, ModelYear,
    VehicleDetailFile, VehicleDetailRecord,
};
