use serde_json::Value;
use tracing::info;

use super::{prompts, take_list, CollectionError, CollectionReport, Collector, PipelineError, Stage};
use crate::vehicle::{ManufacturerDirectory, MANUFACTURERS_KEY};

impl Collector {
    /// Load the cached directory, or query the manufacturer list once and
    /// cache it. A cached directory is trusted as-is.
    pub async fn load_directory(
        &self,
        report: &mut CollectionReport,
    ) -> Result<ManufacturerDirectory, PipelineError> {
        let slot = self.cache.directory_slot.as_str();

        if self.is_cached(Stage::Directory, slot)? {
            report.directory_cached = true;
            return Ok(self.store.read(slot)?);
        }

        info!("Collecting manufacturer directory...");
        let directory = self
            .fetch_directory()
            .await
            .map_err(PipelineError::Directory)?;

        self.store.write(slot, &directory)?;
        info!(
            "Cached {} manufacturers to {}",
            directory.manufacturers.len(),
            self.store.describe(slot)
        );
        Ok(directory)
    }

    async fn fetch_directory(&self) -> Result<ManufacturerDirectory, CollectionError> {
        let prompt = prompts::directory_prompt(&self.collection.market, self.base_year());
        let object = self.query(Stage::Directory, prompt).await?;
        let names = manufacturer_names(take_list(object, MANUFACTURERS_KEY)?)?;
        Ok(ManufacturerDirectory::new(names))
    }
}

/// Trimmed, de-duplicated (case-insensitively) manufacturer names.
fn manufacturer_names(items: Vec<Value>) -> Result<Vec<String>, CollectionError> {
    let mut names: Vec<String> = Vec::with_capacity(items.len());

    for item in items {
        let name = match item {
            Value::String(name) => name.trim().to_string(),
            other => {
                return Err(CollectionError::UnexpectedShape {
                    field: MANUFACTURERS_KEY,
                    reason: format!("expected names, got {}", other),
                })
            }
        };
        let key = ManufacturerDirectory::catalog_key(&name);
        if name.is_empty() || names.iter().any(|n| ManufacturerDirectory::catalog_key(n) == key) {
            continue;
        }
        names.push(name);
    }

    if names.is_empty() {
        return Err(CollectionError::UnexpectedShape {
            field: MANUFACTURERS_KEY,
            reason: "list is empty".to_string(),
        });
    }
    Ok(names)
}
