use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crawl_logging::crawl_info;
use gigcrawl_core::{ResultSet, RunSummary};
use tokio_util::sync::CancellationToken;

use crate::extract::{ChatCompletionExtractor, ExtractionSettings};
use crate::fetch::{FetchSettings, ReqwestFetcher};
use crate::isolate::ContentIsolator;
use crate::persist::{PersistError, ResultWriter};
use crate::progress::ProgressSink;
use crate::schedule::{Scheduler, SourceJob};

pub const DEFAULT_OUTPUT_FILE: &str = "concerts.json";

/// Everything needed to build the production pipeline.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub jobs: Vec<SourceJob>,
    pub delay: Duration,
    pub isolator: ContentIsolator,
    pub fetch: FetchSettings,
    pub extraction: ExtractionSettings,
    pub output_path: PathBuf,
}

impl EngineConfig {
    pub fn new(jobs: Vec<SourceJob>, extraction: ExtractionSettings) -> Self {
        Self {
            jobs,
            delay: crate::schedule::DEFAULT_DELAY,
            isolator: ContentIsolator::default(),
            fetch: FetchSettings::default(),
            extraction,
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("failed to write results: {0}")]
    Persist(#[from] PersistError),
}

/// Crawl, aggregate, persist.
pub struct Engine {
    scheduler: Scheduler,
    writer: ResultWriter,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let fetcher = Arc::new(ReqwestFetcher::new(config.fetch)?);
        let extractor = Arc::new(ChatCompletionExtractor::new(config.extraction)?);
        let scheduler = Scheduler::new(config.jobs, fetcher, extractor)
            .with_delay(config.delay)
            .with_isolator(config.isolator);
        Ok(Self::from_parts(scheduler, ResultWriter::new(config.output_path)))
    }

    pub fn from_parts(scheduler: Scheduler, writer: ResultWriter) -> Self {
        Self { scheduler, writer }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.scheduler = self.scheduler.with_cancellation(cancel);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.scheduler = self.scheduler.with_sink(sink);
        self
    }

    /// Run every source, then write the aggregated result set.
    ///
    /// Only a persistence failure is an error; per-source failures are part of
    /// the returned summary.
    pub async fn run(&self) -> Result<RunSummary, EngineError> {
        let report = self.scheduler.run().await;
        let candidates = report.accumulator.len();
        let result: ResultSet = report.accumulator.into_result_set();
        crawl_info!(
            "aggregated {} candidates into {} unique events",
            candidates,
            result.len()
        );

        let output_path = self.writer.write(&result)?;
        crawl_info!("wrote {} events to {}", result.len(), output_path.display());

        Ok(RunSummary {
            sources: report.sources,
            candidates,
            unique_events: result.len(),
            output_path,
            interrupted: report.interrupted,
        })
    }
}
