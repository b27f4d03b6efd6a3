//! Retrieved document type

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata attached to a stored document (source file, page, ...)
pub type Metadata = Map<String, Value>;

/// A document returned by the vector index for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    /// Document text
    pub content: String,
    /// Metadata key/value pairs
    #[serde(default)]
    pub metadata: Metadata,
}

impl RetrievedDocument {
    /// Create a new retrieved document
    pub fn new(content: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    /// Create a document with a single `source` metadata entry
    pub fn with_source(content: impl Into<String>, source: impl Into<String>) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), Value::String(source.into()));
        Self::new(content, metadata)
    }

    /// Source filename, if present in metadata
    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").and_then(Value::as_str)
    }
}
