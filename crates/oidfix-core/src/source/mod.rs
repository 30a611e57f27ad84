pub mod fetch;
pub mod file;

pub use fetch::FetchSource;
pub use file::FileSource;

use crate::document::Document;
use crate::error::RetrievalError;

/// Where the pipeline obtains the OpenAPI document from.
pub trait DocumentSource {
    /// Short description for log lines, e.g. the URL or file path.
    fn describe(&self) -> String;

    /// Retrieve and parse the document.
    fn load(&self) -> Result<Document, RetrievalError>;
}
