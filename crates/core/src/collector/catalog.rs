use serde_json::Value;
use tracing::{info, warn};

use super::{prompts, take_list, CollectionError, CollectionReport, Collector, PipelineError, Stage};
use crate::config::FailurePolicy;
use crate::metrics;
use crate::vehicle::{ManufacturerDirectory, MANUFACTURERS_KEY};

const VEHICLES_KEY: &str = "vehicles";

impl Collector {
    /// Fetch the catalog of every manufacturer that has none yet.
    ///
    /// The directory is persisted after each merge, so a failure loses at
    /// most the manufacturer in flight. An existing entry counts as done
    /// whatever its content.
    pub async fn collect_catalogs(
        &self,
        directory: &mut ManufacturerDirectory,
        report: &mut CollectionReport,
    ) -> Result<(), PipelineError> {
        let slot = self.cache.directory_slot.clone();
        let names = directory.manufacturers.clone();

        for name in &names {
            if ManufacturerDirectory::catalog_key(name) == MANUFACTURERS_KEY {
                warn!("Manufacturer {:?} collides with the name list key, skipping", name);
                continue;
            }
            if !self.collection.force_refresh && directory.has_catalog(name) {
                report.catalogs_cached += 1;
                metrics::CACHE_HITS
                    .with_label_values(&[Stage::Catalog.as_str()])
                    .inc();
                continue;
            }

            info!("Collecting catalog for {}...", name);
            match self.fetch_catalog(name).await {
                Ok(entries) => {
                    info!("{}: {} model-years", name, entries.len());
                    directory.insert_catalog(name, Value::Array(entries));
                    self.store.write(&slot, &*directory)?;
                    report.catalogs_fetched += 1;
                }
                Err(source) => match self.policy(Stage::Catalog) {
                    FailurePolicy::Abort => {
                        return Err(PipelineError::Catalog {
                            manufacturer: name.clone(),
                            source,
                        })
                    }
                    FailurePolicy::Skip => {
                        warn!("Skipping catalog for {}: {}", name, source);
                        metrics::UNITS_SKIPPED
                            .with_label_values(&[Stage::Catalog.as_str()])
                            .inc();
                        report.catalogs_skipped += 1;
                    }
                },
            }
        }

        Ok(())
    }

    async fn fetch_catalog(&self, manufacturer: &str) -> Result<Vec<Value>, CollectionError> {
        let prompt = prompts::catalog_prompt(manufacturer, self.base_year());
        let object = self.query(Stage::Catalog, prompt).await?;
        take_list(object, VEHICLES_KEY)
    }
}
