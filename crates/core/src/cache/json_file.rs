use serde_json::Value;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use super::{CacheError, CacheStore};

/// Cache store backed by pretty-printed JSON files under a root directory.
///
/// Slot `name` lives at `<root>/<name>.json`. Writes go to a sibling
/// `.tmp` file which is synced and then renamed over the target, so
/// readers only ever see complete snapshots.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a slot name to its file, rejecting names that leave the root.
    pub fn slot_path(&self, slot: &str) -> Result<PathBuf, CacheError> {
        let relative = Path::new(slot);
        let well_formed = !slot.is_empty()
            && !slot.contains('\\')
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !well_formed {
            return Err(CacheError::InvalidSlot(slot.to_string()));
        }
        Ok(self.root.join(format!("{}.json", slot)))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> CacheError + '_ {
    move |source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl CacheStore for JsonFileStore {
    fn exists(&self, slot: &str) -> Result<bool, CacheError> {
        let path = self.slot_path(slot)?;
        path.try_exists().map_err(io_error(&path))
    }

    fn read_value(&self, slot: &str) -> Result<Value, CacheError> {
        let path = self.slot_path(slot)?;
        let bytes = fs::read(&path).map_err(io_error(&path))?;
        serde_json::from_slice(&bytes).map_err(|source| CacheError::Json { path, source })
    }

    fn write_value(&self, slot: &str, value: &Value) -> Result<(), CacheError> {
        let path = self.slot_path(slot)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }

        let bytes = serde_json::to_vec_pretty(value).map_err(|source| CacheError::Json {
            path: path.clone(),
            source,
        })?;

        let tmp_path = path.with_extension("json.tmp");
        let mut file = File::create(&tmp_path).map_err(io_error(&tmp_path))?;
        file.write_all(&bytes).map_err(io_error(&tmp_path))?;
        file.sync_all().map_err(io_error(&tmp_path))?;
        drop(file);

        fs::rename(&tmp_path, &path).map_err(io_error(&path))?;
        tracing::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    fn describe(&self, slot: &str) -> String {
        self.root.join(format!("{}.json", slot)).display().to_string()
    }
}
