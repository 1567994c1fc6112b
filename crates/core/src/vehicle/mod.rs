//! Vehicle data model: the manufacturer directory, catalog entries and
//! per-badge detail records, as persisted in the cache.

mod directory;
mod key;
mod types;

pub use directory::{ManufacturerDirectory, MANUFACTURERS_KEY};
pub use key::CacheKey;
pub use types::*;
