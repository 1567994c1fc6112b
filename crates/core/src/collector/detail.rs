use std::collections::HashSet;
use tracing::{error, info, warn};

use super::{prompts, take_list, CollectionError, CollectionReport, Collector, PipelineError, Stage};
use crate::config::FailurePolicy;
use crate::metrics;
use crate::vehicle::{CacheKey, CatalogEntry, ManufacturerDirectory, VehicleDetailFile, VehicleDetailRecord};

const VEHICLES_KEY: &str = "vehicles";

impl Collector {
    /// Fetch per-badge details for every catalog entry without a detail file.
    ///
    /// Entries are keyed by model-year, independent of the manufacturer
    /// that listed them; each key is fetched at most once per run.
    pub async fn collect_details(
        &self,
        directory: &ManufacturerDirectory,
        report: &mut CollectionReport,
    ) -> Result<(), PipelineError> {
        let mut seen: HashSet<CacheKey> = HashSet::new();

        for name in &directory.manufacturers {
            let entries = match directory.catalog_entries(name) {
                None => continue,
                Some(Ok(entries)) => entries,
                Some(Err(source)) => match self.policy(Stage::Detail) {
                    FailurePolicy::Abort => {
                        return Err(PipelineError::MalformedCatalog {
                            manufacturer: name.clone(),
                            source,
                        })
                    }
                    FailurePolicy::Skip => {
                        warn!("Skipping malformed catalog for {}: {}", name, source);
                        metrics::UNITS_SKIPPED
                            .with_label_values(&[Stage::Detail.as_str()])
                            .inc();
                        report.details_skipped += 1;
                        continue;
                    }
                },
            };

            for entry in entries {
                let key = entry.cache_key();
                if !seen.insert(key.clone()) {
                    continue;
                }

                let slot = key.slot(&self.cache.details_dir);
                if self.is_cached(Stage::Detail, &slot)? {
                    report.details_cached += 1;
                    continue;
                }

                info!(
                    "Collecting data for {} {} {}...",
                    entry.year,
                    entry.make_name(),
                    entry.model_name()
                );
                match self.fetch_details(name, &entry).await {
                    Ok(file) => {
                        self.store.write(&slot, &file)?;
                        metrics::DETAIL_FILES_WRITTEN.inc();
                        report.details_fetched += 1;
                    }
                    Err(source) => {
                        error!("An error occurred collecting {}: {}", key, source);
                        match self.policy(Stage::Detail) {
                            FailurePolicy::Abort => {
                                return Err(PipelineError::Detail {
                                    key: key.to_string(),
                                    source,
                                })
                            }
                            FailurePolicy::Skip => {
                                metrics::UNITS_SKIPPED
                                    .with_label_values(&[Stage::Detail.as_str()])
                                    .inc();
                                report.details_skipped += 1;
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Query one model-year and attach a cost breakdown to every badge.
    async fn fetch_details(
        &self,
        manufacturer: &str,
        entry: &CatalogEntry,
    ) -> Result<VehicleDetailFile, CollectionError> {
        let prompt = prompts::detail_prompt(manufacturer, entry);
        let object = self.query(Stage::Detail, prompt).await?;
        let items = take_list(object, VEHICLES_KEY)?;

        let mut vehicles = Vec::with_capacity(items.len());
        for item in items {
            let mut record: VehicleDetailRecord =
                serde_json::from_value(item).map_err(|e| CollectionError::UnexpectedShape {
                    field: VEHICLES_KEY,
                    reason: format!("badge record does not match: {}", e),
                })?;
            record.attach_cost();
            vehicles.push(record);
        }

        Ok(VehicleDetailFile { vehicles })
    }
}
