use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{MalformedDocumentError, ParseError, PersistError};

/// Serialization format of a source document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentFormat {
    #[default]
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick a format from a file extension. Anything that is not `.yaml` or
    /// `.yml` is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => DocumentFormat::Yaml,
            _ => DocumentFormat::Json,
        }
    }
}

/// An OpenAPI document held as a generic, order-preserving JSON tree.
///
/// Only `paths` and the `tags` / `operationId` fields of operations are ever
/// inspected; every other node round-trips untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

/// Parse a document from JSON.
pub fn from_json(input: &str) -> Result<Document, ParseError> {
    let root: Value = serde_json::from_str(input)?;
    Ok(Document { root })
}

/// Parse a document from YAML.
pub fn from_yaml(input: &str) -> Result<Document, ParseError> {
    let root: Value = serde_yaml_ng::from_str(input)?;
    Ok(Document { root })
}

/// Parse raw bytes in the given format.
pub fn from_bytes(input: &[u8], format: DocumentFormat) -> Result<Document, ParseError> {
    let root: Value = match format {
        DocumentFormat::Json => serde_json::from_slice(input)?,
        DocumentFormat::Yaml => serde_yaml_ng::from_slice(input)?,
    };
    Ok(Document { root })
}

impl Document {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// The top-level `paths` object.
    pub fn paths(&self) -> Result<&Map<String, Value>, MalformedDocumentError> {
        match self.root.get("paths") {
            None => Err(MalformedDocumentError::MissingPaths),
            Some(Value::Object(paths)) => Ok(paths),
            Some(other) => Err(MalformedDocumentError::PathsNotObject(kind_of(other))),
        }
    }

    pub fn paths_mut(&mut self) -> Result<&mut Map<String, Value>, MalformedDocumentError> {
        match self.root.get_mut("paths") {
            None => Err(MalformedDocumentError::MissingPaths),
            Some(Value::Object(paths)) => Ok(paths),
            Some(other) => Err(MalformedDocumentError::PathsNotObject(kind_of(other))),
        }
    }

    /// Number of object-valued entries across all path items.
    pub fn operation_count(&self) -> Result<usize, MalformedDocumentError> {
        let mut count = 0;
        for (path, item) in self.paths()? {
            let Value::Object(item) = item else {
                return Err(MalformedDocumentError::PathItemNotObject {
                    path: path.clone(),
                    found: kind_of(item),
                });
            };
            count += item.values().filter(|v| v.is_object()).count();
        }
        Ok(count)
    }

    /// Serialize with 2-space indentation and no trailing newline.
    pub fn to_pretty_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }
}

/// Human-readable JSON type name, used in error messages.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
