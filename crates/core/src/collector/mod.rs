//! The resumable collection pipeline.
//!
//! ```text
//! directory ──► catalog (per manufacturer) ──► detail (per model-year)
//!     │                 │                             │
//!     └─────────────────┴──── cache slot exists? ─────┘ skip
//! ```
//!
//! Every unit of work is guarded by an existence check on its cache slot
//! and persisted as soon as it completes, so an interrupted run resumes at
//! the first missing slot. One model query is outstanding at a time.

mod catalog;
mod detail;
mod directory;
mod error;
mod prompts;
mod types;

pub use error::{CollectionError, PipelineError, Stage};
pub use types::CollectionReport;

use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::config::{CacheConfig, CollectionConfig, Config, FailurePolicy};
use crate::extract::{extract_json, ITEMS_KEY};
use crate::llm::{CompletionRequest, LlmClient};
use crate::metrics;

/// Runs the directory, catalog and detail stages against a model and a cache.
pub struct Collector {
    client: Arc<dyn LlmClient>,
    store: Arc<dyn CacheStore>,
    collection: CollectionConfig,
    cache: CacheConfig,
    max_tokens: u32,
    temperature: f32,
}

impl Collector {
    pub fn new(client: Arc<dyn LlmClient>, store: Arc<dyn CacheStore>) -> Self {
        let llm = crate::config::LlmConfig::default();
        Self {
            client,
            store,
            collection: CollectionConfig::default(),
            cache: CacheConfig::default(),
            max_tokens: llm.max_tokens,
            temperature: llm.temperature,
        }
    }

    pub fn from_config(
        client: Arc<dyn LlmClient>,
        store: Arc<dyn CacheStore>,
        config: &Config,
    ) -> Self {
        Self {
            client,
            store,
            collection: config.collection.clone(),
            cache: config.cache.clone(),
            max_tokens: config.llm.max_tokens,
            temperature: config.llm.temperature,
        }
    }

    pub fn with_collection_config(mut self, collection: CollectionConfig) -> Self {
        self.collection = collection;
        self
    }

    pub fn with_cache_config(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Run every stage in order and return the merged directory.
    ///
    /// The first aborting failure ends the run; everything persisted before
    /// it stays valid for the next run.
    pub async fn run(&self) -> Result<CollectionReport, PipelineError> {
        let started = Instant::now();
        let mut report = CollectionReport::default();

        let mut directory = self.load_directory(&mut report).await?;
        info!(
            "Directory holds {} manufacturers ({} with catalogs)",
            directory.manufacturers.len(),
            directory.catalog_count()
        );

        self.collect_catalogs(&mut directory, &mut report).await?;
        self.collect_details(&directory, &mut report).await?;

        info!(
            "Collection finished in {:.1}s: {} catalogs fetched ({} cached, {} skipped), \
             {} detail files fetched ({} cached, {} skipped)",
            started.elapsed().as_secs_f64(),
            report.catalogs_fetched,
            report.catalogs_cached,
            report.catalogs_skipped,
            report.details_fetched,
            report.details_cached,
            report.details_skipped,
        );

        report.directory = directory;
        Ok(report)
    }

    fn base_year(&self) -> i32 {
        self.collection.effective_base_year()
    }

    /// Whether an existing slot lets a unit of work be skipped.
    fn is_cached(&self, stage: Stage, slot: &str) -> Result<bool, PipelineError> {
        if self.collection.force_refresh {
            return Ok(false);
        }
        let cached = self.store.exists(slot)?;
        if cached {
            debug!("{} cache hit: {}", stage, self.store.describe(slot));
            metrics::CACHE_HITS.with_label_values(&[stage.as_str()]).inc();
        }
        Ok(cached)
    }

    fn policy(&self, stage: Stage) -> FailurePolicy {
        match stage {
            Stage::Directory => FailurePolicy::Abort,
            Stage::Catalog => self.collection.catalog_failure,
            Stage::Detail => self.collection.detail_failure,
        }
    }

    /// Issue one model query and extract a JSON object from the answer.
    async fn query(&self, stage: Stage, prompt: String) -> Result<Map<String, Value>, CollectionError> {
        let request = CompletionRequest::new(prompt)
            .with_system(prompts::SYSTEM_PROMPT)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);

        let timer = metrics::MODEL_QUERY_DURATION
            .with_label_values(&[stage.as_str()])
            .start_timer();
        let result = self.client.complete(request).await;
        timer.observe_duration();

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                metrics::MODEL_QUERIES
                    .with_label_values(&[stage.as_str(), "query_error"])
                    .inc();
                return Err(e.into());
            }
        };

        let provider = self.client.provider();
        metrics::LLM_TOKENS
            .with_label_values(&[provider, "input"])
            .inc_by(response.usage.input_tokens.into());
        metrics::LLM_TOKENS
            .with_label_values(&[provider, "output"])
            .inc_by(response.usage.output_tokens.into());

        match extract_json(response.text.trim()) {
            Ok(object) => {
                metrics::MODEL_QUERIES
                    .with_label_values(&[stage.as_str(), "ok"])
                    .inc();
                Ok(object)
            }
            Err(e) => {
                metrics::MODEL_QUERIES
                    .with_label_values(&[stage.as_str(), "unparseable"])
                    .inc();
                Err(e.into())
            }
        }
    }
}

/// Take the list stored under `field`, or under [`ITEMS_KEY`] when the
/// model answered with a bare array.
fn take_list(
    mut object: Map<String, Value>,
    field: &'static str,
) -> Result<Vec<Value>, CollectionError> {
    let value = match object.remove(field).or_else(|| object.remove(ITEMS_KEY)) {
        Some(value) => value,
        None => {
            return Err(CollectionError::UnexpectedShape {
                field,
                reason: format!("response keys are {:?}", object.keys().collect::<Vec<_>>()),
            })
        }
    };

    match value {
        Value::Array(items) => Ok(items),
        other => Err(CollectionError::UnexpectedShape {
            field,
            reason: format!("expected a list, got {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
