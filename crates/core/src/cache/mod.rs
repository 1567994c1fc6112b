//! Durable JSON slots: resumability checkpoints and the final dataset.
//!
//! A slot is named by a relative, `/`-separated name such as
//! `manufacturers` or `data/2025-kia-ev9`. Presence of a slot is what marks
//! a unit of work as done.

mod json_file;

pub use json_file::JsonFileStore;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

/// Errors for cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache JSON error at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid slot name: {0:?}")]
    InvalidSlot(String),
}

/// Trait for cache storage.
pub trait CacheStore: Send + Sync {
    /// Whether the slot holds a snapshot. Does not read it.
    fn exists(&self, slot: &str) -> Result<bool, CacheError>;

    fn read_value(&self, slot: &str) -> Result<Value, CacheError>;

    /// Replace the slot's content. A completed write is a whole snapshot.
    fn write_value(&self, slot: &str, value: &Value) -> Result<(), CacheError>;

    /// Human-readable location of a slot, for logs.
    fn describe(&self, slot: &str) -> String;
}

impl dyn CacheStore {
    pub fn read<T: DeserializeOwned>(&self, slot: &str) -> Result<T, CacheError> {
        let value = self.read_value(slot)?;
        serde_json::from_value(value).map_err(|source| CacheError::Json {
            path: PathBuf::from(self.describe(slot)),
            source,
        })
    }

    pub fn write<T: Serialize>(&self, slot: &str, value: &T) -> Result<(), CacheError> {
        let value = serde_json::to_value(value).map_err(|source| CacheError::Json {
            path: PathBuf::from(self.describe(slot)),
            source,
        })?;
        self.write_value(slot, &value)
    }
}
