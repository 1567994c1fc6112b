use std::fmt;
use thiserror::Error;

use crate::cache::CacheError;
use crate::extract::ExtractionError;
use crate::llm::LlmError;

/// Pipeline stage, for errors, logs and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Directory,
    Catalog,
    Detail,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Directory => "directory",
            Stage::Catalog => "catalog",
            Stage::Detail => "detail",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One query/extraction cycle failed.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("Model query failed: {0}")]
    Query(#[from] LlmError),

    #[error("Failed to extract JSON data from the response: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Response has no usable {field:?} list: {reason}")]
    UnexpectedShape { field: &'static str, reason: String },
}

/// Errors that end a collection run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Manufacturer directory collection failed: {0}")]
    Directory(#[source] CollectionError),

    #[error("Catalog collection failed for {manufacturer}: {source}")]
    Catalog {
        manufacturer: String,
        #[source]
        source: CollectionError,
    },

    #[error("Cached catalog for {manufacturer} is malformed: {source}")]
    MalformedCatalog {
        manufacturer: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Detail collection failed for {key}: {source}")]
    Detail {
        key: String,
        #[source]
        source: CollectionError,
    },

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl PipelineError {
    /// Stage that raised the error; `None` for cache I/O, which any stage can hit.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Directory(_) => Some(Stage::Directory),
            PipelineError::Catalog { .. } => Some(Stage::Catalog),
            PipelineError::MalformedCatalog { .. } | PipelineError::Detail { .. } => {
                Some(Stage::Detail)
            }
            PipelineError::Cache(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::Detail {
            key: "2025-kia-ev9".to_string(),
            source: CollectionError::Query(LlmError::EmptyResponse),
        };
        assert_eq!(
            err.to_string(),
            "Detail collection failed for 2025-kia-ev9: Model query failed: Model returned no text"
        );
        assert_eq!(err.stage(), Some(Stage::Detail));

        let err = CollectionError::UnexpectedShape {
            field: "manufacturers",
            reason: "list is empty".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Response has no usable \"manufacturers\" list: list is empty"
        );
    }
}
