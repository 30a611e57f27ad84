use std::time::Duration;

use log::{debug, info};
use reqwest::blocking::Client;
use url::Url;

use super::DocumentSource;
use crate::document::{self, Document, DocumentFormat};
use crate::error::RetrievalError;

/// Downloads the document with a blocking HTTP GET.
#[derive(Debug, Clone)]
pub struct FetchSource {
    url: Url,
    client: Client,
}

impl FetchSource {
    /// Build a source for `url`. A `timeout` of `None` waits indefinitely.
    pub fn new(url: &str, timeout: Option<Duration>) -> Result<Self, RetrievalError> {
        let url = Url::parse(url).map_err(|source| RetrievalError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(RetrievalError::Client)?;

        Ok(Self { url, client })
    }
}

impl DocumentSource for FetchSource {
    fn describe(&self) -> String {
        self.url.to_string()
    }

    fn load(&self) -> Result<Document, RetrievalError> {
        let url = self.url.as_str();
        info!("fetching OpenAPI document from {url}");

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .map_err(|source| RetrievalError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().map_err(|source| RetrievalError::Request {
            url: url.to_string(),
            source,
        })?;
        debug!("received {} bytes from {url}", body.len());

        document::from_bytes(&body, DocumentFormat::Json).map_err(|source| {
            RetrievalError::Body {
                origin: url.to_string(),
                source,
            }
        })
    }
}
