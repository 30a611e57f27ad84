use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure while obtaining the source document, over HTTP or from disk.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("invalid source URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("{origin} is not a valid OpenAPI document: {source}")]
    Body {
        origin: String,
        #[source]
        source: ParseError,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The document does not have the `paths` shape the normalizer walks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedDocumentError {
    #[error("document has no `paths` object")]
    MissingPaths,

    #[error("`paths` must be an object, found {0}")]
    PathsNotObject(&'static str),

    #[error("path item `{path}` must be an object, found {found}")]
    PathItemNotObject { path: String, found: &'static str },
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("destination {} has no parent directory", path.display())]
    NoParent { path: PathBuf },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("malformed document: {0}")]
    Malformed(#[from] MalformedDocumentError),

    #[error("persist error: {0}")]
    Persist(#[from] PersistError),

    #[error("pipeline has already run (stage: {0})")]
    AlreadyRun(crate::pipeline::Stage),
}
