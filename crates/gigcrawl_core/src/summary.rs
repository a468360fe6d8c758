use std::fmt;
use std::path::PathBuf;

use crate::{SourceOutcome, SourceReport};

/// Human-facing account of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub sources: Vec<SourceReport>,
    pub candidates: usize,
    pub unique_events: usize,
    pub output_path: PathBuf,
    pub interrupted: bool,
}

impl RunSummary {
    pub fn failed_sources(&self) -> usize {
        self.sources
            .iter()
            .filter(|report| report.outcome.is_failure())
            .count()
    }

    pub fn skipped_sources(&self) -> usize {
        self.sources
            .iter()
            .filter(|report| report.outcome == SourceOutcome::Skipped)
            .count()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for report in &self.sources {
            writeln!(f, "  {}: {}", report.source, report.outcome)?;
        }
        if self.interrupted {
            writeln!(
                f,
                "Run interrupted; {} source(s) skipped.",
                self.skipped_sources()
            )?;
        }
        write!(
            f,
            "Crawled {} unique events and saved to {}",
            self.unique_events,
            self.output_path.display()
        )
    }
}
