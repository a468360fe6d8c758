use std::sync::Arc;
use std::time::Duration;

use crawl_logging::crawl_error;
use gigcrawl_core::{
    Accumulator, EventCandidate, Source, SourceOutcome, SourceReport, SourceRun, Stage,
};
use tokio_util::sync::CancellationToken;

use crate::extract::EventExtractor;
use crate::fetch::Fetcher;
use crate::isolate::ContentIsolator;
use crate::progress::{LoggingProgressSink, ProgressSink};
use crate::CrawlEvent;

pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// A source plus an optional selector list that replaces the default one.
#[derive(Debug, Clone)]
pub struct SourceJob {
    pub source: Source,
    pub isolator: Option<ContentIsolator>,
}

impl SourceJob {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            isolator: None,
        }
    }

    pub fn with_isolator(mut self, isolator: ContentIsolator) -> Self {
        self.isolator = Some(isolator);
        self
    }
}

/// What the scheduler hands to aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub accumulator: Accumulator,
    pub sources: Vec<SourceReport>,
    pub interrupted: bool,
}

enum Processed {
    Batch(Vec<EventCandidate>),
    Finished(SourceOutcome),
}

/// Drives sources strictly one after another with a fixed pause in between.
///
/// A failing source ends as a zero-count outcome and the run moves on. When the
/// cancellation token fires, the in-flight source is dropped without committing
/// anything and the remaining sources are skipped.
pub struct Scheduler {
    jobs: Vec<SourceJob>,
    delay: Duration,
    fetcher: Arc<dyn Fetcher>,
    isolator: ContentIsolator,
    extractor: Arc<dyn EventExtractor>,
    sink: Arc<dyn ProgressSink>,
    cancel: CancellationToken,
}

impl Scheduler {
    pub fn new(
        jobs: Vec<SourceJob>,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn EventExtractor>,
    ) -> Self {
        Self {
            jobs,
            delay: DEFAULT_DELAY,
            fetcher,
            isolator: ContentIsolator::default(),
            extractor,
            sink: Arc::new(LoggingProgressSink),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_isolator(mut self, isolator: ContentIsolator) -> Self {
        self.isolator = isolator;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub async fn run(&self) -> CrawlReport {
        let mut accumulator = Accumulator::new();
        let mut sources = Vec::with_capacity(self.jobs.len());
        let mut interrupted = false;

        for (index, job) in self.jobs.iter().enumerate() {
            if interrupted || self.cancel.is_cancelled() {
                interrupted = true;
                self.report(index, SourceRun::new(job.source.clone()), &mut sources);
                continue;
            }

            let mut run = SourceRun::new(job.source.clone());
            let processed = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                processed = self.process(index, job, &mut run) => Some(processed),
            };

            let outcome = match processed {
                Some(Processed::Batch(batch)) => {
                    let count = batch.len();
                    accumulator.commit(batch);
                    SourceOutcome::Extracted { count }
                }
                Some(Processed::Finished(outcome)) => outcome,
                None => {
                    interrupted = true;
                    SourceOutcome::Interrupted { stage: run.stage() }
                }
            };
            if let Err(err) = run.finish(outcome) {
                crawl_error!("{}: {}", job.source, err);
            }
            self.report(index, run, &mut sources);

            let is_last = index + 1 == self.jobs.len();
            if !is_last && !interrupted {
                interrupted = !self.pause().await;
            }
        }

        CrawlReport {
            accumulator,
            sources,
            interrupted,
        }
    }

    async fn process(&self, index: usize, job: &SourceJob, run: &mut SourceRun) -> Processed {
        if let Err(outcome) = self.enter(index, run, Stage::Fetching) {
            return Processed::Finished(outcome);
        }
        let page = match self.fetcher.fetch(&job.source).await {
            Ok(page) => page,
            Err(err) => return Processed::Finished(failed(Stage::Fetching, err)),
        };

        if let Err(outcome) = self.enter(index, run, Stage::Isolating) {
            return Processed::Finished(outcome);
        }
        let isolator = job.isolator.as_ref().unwrap_or(&self.isolator);
        let Some(fragment) = isolator.isolate(&page.html) else {
            return Processed::Finished(SourceOutcome::NoContent);
        };

        if let Err(outcome) = self.enter(index, run, Stage::Extracting) {
            return Processed::Finished(outcome);
        }
        match self.extractor.extract(&fragment).await {
            Ok(batch) => Processed::Batch(batch),
            Err(err) => Processed::Finished(failed(Stage::Extracting, err)),
        }
    }

    fn enter(&self, index: usize, run: &mut SourceRun, stage: Stage) -> Result<(), SourceOutcome> {
        let from = run.stage();
        run.advance(stage)
            .map_err(|err| failed(from, err))?;
        self.sink.emit(CrawlEvent::Stage {
            index,
            source: run.source().clone(),
            stage,
        });
        Ok(())
    }

    /// Returns false if the pause was cut short by cancellation.
    async fn pause(&self) -> bool {
        if self.delay.is_zero() {
            return !self.cancel.is_cancelled();
        }
        self.sink.emit(CrawlEvent::Waiting {
            delay_ms: self.delay.as_millis() as u64,
        });
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(self.delay) => true,
        }
    }

    fn report(&self, index: usize, run: SourceRun, sources: &mut Vec<SourceReport>) {
        let report = run.into_report();
        self.sink.emit(CrawlEvent::SourceFinished {
            index,
            source: report.source.clone(),
            outcome: report.outcome.clone(),
        });
        sources.push(report);
    }
}

fn failed(stage: Stage, err: impl std::fmt::Display) -> SourceOutcome {
    SourceOutcome::Failed {
        stage,
        reason: err.to_string(),
    }
}
