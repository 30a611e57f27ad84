use std::fs;
use std::path::PathBuf;

use log::info;

use super::DocumentSource;
use crate::document::{self, Document, DocumentFormat};
use crate::error::RetrievalError;

/// Reads the document from a local JSON or YAML file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DocumentSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Document, RetrievalError> {
        info!("reading OpenAPI document from {}", self.path.display());

        let content = fs::read(&self.path).map_err(|source| RetrievalError::Read {
            path: self.path.clone(),
            source,
        })?;

        document::from_bytes(&content, DocumentFormat::from_path(&self.path)).map_err(|source| {
            RetrievalError::Body {
                origin: self.describe(),
                source,
            }
        })
    }
}
