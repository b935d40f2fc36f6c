//! Label table loaded from the model metadata document.
//!
//! The metadata is a JSON object whose `labels` field lists class names in the
//! order of the model outputs:
//!
//! ```json
//! { "labels": ["person", "car", "bottle"] }
//! ```
use std::path::Path;

use serde::Deserialize;

use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct Metadata {
    labels: Option<Vec<String>>,
}

/// Ordered class names, index-aligned with the model output.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelTable(Vec<String>);

impl LabelTable {
    pub fn new(labels: Vec<String>) -> Self {
        Self(labels)
    }

    /// Parse a metadata document.
    ///
    /// A document without a `labels` field yields an empty table and a warning.
    /// Anything that is not a JSON object is an error.
    pub fn from_metadata_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let metadata: Metadata = serde_json::from_str(json)?;
        match metadata.labels {
            Some(labels) => Ok(Self(labels)),
            None => {
                log::warn!("Metadata has no labels field, continuing without labels");
                Ok(Self::default())
            }
        }
    }

    /// Read and parse a metadata document from disk.
    pub fn from_metadata_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let resource = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|err| Error::load(&resource, err))?;
        Self::from_metadata_json(&json).map_err(|err| Error::load(resource, err))
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
