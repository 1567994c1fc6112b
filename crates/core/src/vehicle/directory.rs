use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

use super::CatalogEntry;

/// Key of the manufacturer name list in the persisted directory.
pub const MANUFACTURERS_KEY: &str = "manufacturers";

/// The root cached entity.
///
/// On disk this is one flat object: `"manufacturers"` holds the names and
/// every other key is a lower-cased manufacturer name mapping to its
/// catalog. Catalogs stay raw JSON so whatever was cached, even a
/// malformed list, round-trips untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManufacturerDirectory {
    pub manufacturers: Vec<String>,
    #[serde(flatten)]
    catalogs: BTreeMap<String, Value>,
}

impl ManufacturerDirectory {
    pub fn new(manufacturers: Vec<String>) -> Self {
        Self {
            manufacturers,
            catalogs: BTreeMap::new(),
        }
    }

    /// Map key for a manufacturer name.
    pub fn catalog_key(name: &str) -> String {
        name.to_lowercase()
    }

    /// Whether a catalog entry exists, regardless of its content.
    pub fn has_catalog(&self, name: &str) -> bool {
        self.catalogs.contains_key(&Self::catalog_key(name))
    }

    pub fn catalog(&self, name: &str) -> Option<&Value> {
        self.catalogs.get(&Self::catalog_key(name))
    }

    /// Typed view of a manufacturer's catalog; `None` when it was never fetched.
    ///
    /// Only a catalog that is not a list is an error. Entries that are not
    /// objects are logged and left out.
    pub fn catalog_entries(
        &self,
        name: &str,
    ) -> Option<Result<Vec<CatalogEntry>, serde_json::Error>> {
        let catalog = self.catalog(name)?;
        let items = match catalog {
            Value::Array(items) => items,
            other => return Some(Vec::<CatalogEntry>::deserialize(other)),
        };

        let entries = items
            .iter()
            .filter_map(|item| match CatalogEntry::deserialize(item) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Ignoring catalog entry {} for {}: {}", item, name, e);
                    None
                }
            })
            .collect();
        Some(Ok(entries))
    }

    /// Store a manufacturer's catalog, replacing any previous one.
    pub fn insert_catalog(&mut self, name: &str, catalog: Value) {
        self.catalogs.insert(Self::catalog_key(name), catalog);
    }

    pub fn catalog_count(&self) -> usize {
        self.manufacturers
            .iter()
            .filter(|name| self.has_catalog(name))
            .count()
    }
}
