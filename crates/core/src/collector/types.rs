use serde::Serialize;

use crate::vehicle::ManufacturerDirectory;

/// Outcome of a completed collection run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionReport {
    /// The fully merged directory, as persisted.
    pub directory: ManufacturerDirectory,
    /// Whether the directory came from the cache.
    pub directory_cached: bool,
    pub catalogs_fetched: usize,
    pub catalogs_cached: usize,
    pub catalogs_skipped: usize,
    pub details_fetched: usize,
    pub details_cached: usize,
    pub details_skipped: usize,
}

