pub mod config;
pub mod document;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod source;
pub mod writer;

pub use document::{Document, DocumentFormat};
pub use normalize::{NormalizeReport, normalize_operation_ids};
pub use pipeline::{Pipeline, PipelineOutcome, Stage};
