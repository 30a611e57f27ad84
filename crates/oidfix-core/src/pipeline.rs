use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::config::{PipelineConfig, SourceConfig};
use crate::document::Document;
use crate::error::PipelineError;
use crate::normalize::{NormalizeReport, normalize_operation_ids};
use crate::source::{DocumentSource, FetchSource, FileSource};
use crate::writer::write_document;

/// Progress of a single pipeline run. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Fetching,
    Normalizing,
    Writing,
    Done,
    Failed,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Fetching => "fetching",
            Stage::Normalizing => "normalizing",
            Stage::Writing => "writing",
            Stage::Done => "done",
            Stage::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub report: NormalizeReport,
    pub document: Document,
    /// `None` for a dry run.
    pub written_to: Option<PathBuf>,
}

/// Fetch (or read) → normalize → write, aborting on the first failure.
pub struct Pipeline {
    source: Box<dyn DocumentSource>,
    destination: PathBuf,
    stage: Stage,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("source", &self.source.describe())
            .field("destination", &self.destination)
            .field("stage", &self.stage)
            .finish()
    }
}

impl Pipeline {
    pub fn new(source: Box<dyn DocumentSource>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source,
            destination: destination.into(),
            stage: Stage::Idle,
        }
    }

    /// Build a pipeline with the source selected by `config`.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let source: Box<dyn DocumentSource> = match &config.source {
            SourceConfig::Url(url) => Box::new(FetchSource::new(url, config.fetch.timeout())?),
            SourceConfig::File(path) => Box::new(FileSource::new(path)),
        };
        Ok(Self::new(source, &config.output))
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn source(&self) -> &dyn DocumentSource {
        self.source.as_ref()
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Run every step and overwrite the destination.
    pub fn run(&mut self) -> Result<PipelineOutcome, PipelineError> {
        self.execute(true)
    }

    /// Retrieve and normalize without touching the destination.
    pub fn dry_run(&mut self) -> Result<PipelineOutcome, PipelineError> {
        self.execute(false)
    }

    fn execute(&mut self, write: bool) -> Result<PipelineOutcome, PipelineError> {
        if self.stage != Stage::Idle {
            return Err(PipelineError::AlreadyRun(self.stage));
        }
        let result = self.steps(write);
        match &result {
            Ok(_) => self.transition(Stage::Done),
            Err(e) => {
                debug!("pipeline failed during {}: {e}", self.stage);
                self.transition(Stage::Failed);
            }
        }
        result
    }

    fn steps(&mut self, write: bool) -> Result<PipelineOutcome, PipelineError> {
        self.transition(Stage::Fetching);
        let mut document = self.source.load()?;

        self.transition(Stage::Normalizing);
        let report = normalize_operation_ids(&mut document)?;
        info!(
            "normalized {} of {} operationIds",
            report.renames.len(),
            report.operations
        );

        if !write {
            return Ok(PipelineOutcome {
                report,
                document,
                written_to: None,
            });
        }

        self.transition(Stage::Writing);
        write_document(&document, &self.destination)?;

        Ok(PipelineOutcome {
            report,
            document,
            written_to: Some(self.destination.clone()),
        })
    }

    fn transition(&mut self, next: Stage) {
        debug!("pipeline stage: {} -> {}", self.stage, next);
        self.stage = next;
    }
}
