use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// FastAPI backend schema endpoint used during local development.
pub const DEFAULT_SOURCE_URL: &str = "http://localhost:8000/api/v1/openapi.json";

/// File the client generator reads.
pub const DEFAULT_OUTPUT: &str = "./openapi.json";

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".oidfix.yaml";

/// Top-level project configuration loaded from `.oidfix.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    #[serde(with = "serde_yaml_ng::with::singleton_map")]
    pub source: SourceConfig,
    pub output: PathBuf,
    pub fetch: FetchConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            fetch: FetchConfig::default(),
        }
    }
}

/// Where to read the document from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceConfig {
    /// Fetch over HTTP.
    Url(String),
    /// Read a local JSON or YAML file.
    File(PathBuf),
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Url(DEFAULT_SOURCE_URL.to_string())
    }
}

/// HTTP fetch options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Request timeout in seconds; `0` disables the timeout.
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl PipelineConfig {
    /// Reject values that cannot produce a working pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.source {
            SourceConfig::Url(url) if url.trim().is_empty() => {
                return Err(ConfigError::Invalid("source url is empty".to_string()));
            }
            SourceConfig::File(path) if path.as_os_str().is_empty() => {
                return Err(ConfigError::Invalid("source file is empty".to_string()));
            }
            _ => {}
        }
        if self.output.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("output path is empty".to_string()));
        }
        Ok(())
    }
}

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
///
/// The result is not validated; callers apply their overrides first and then
/// call [`PipelineConfig::validate`].
pub fn load_config(path: &Path) -> Result<Option<PipelineConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: PipelineConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# oidfix configuration
source:
  url: http://localhost:8000/api/v1/openapi.json
  # file: ./openapi.json     # read a local JSON/YAML file instead of fetching

output: ./openapi.json

fetch:
  timeout_secs: 30           # 0 = no timeout
"#
}
