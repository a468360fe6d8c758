use std::fmt;

use crate::Source;

/// Processing stage of a single source within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Pending,
    Fetching,
    Isolating,
    Extracting,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Pending => "pending",
            Stage::Fetching => "fetching",
            Stage::Isolating => "isolating",
            Stage::Extracting => "extracting",
            Stage::Done => "done",
        };
        f.write_str(label)
    }
}

/// How a source finished. Every variant other than `Extracted` contributes zero records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    Extracted { count: usize },
    /// None of the content selectors matched; not an error.
    NoContent,
    Failed { stage: Stage, reason: String },
    /// Stopped mid-flight by cancellation; partial work was discarded.
    Interrupted { stage: Stage },
    /// Never started because the run was cancelled earlier.
    Skipped,
}

impl SourceOutcome {
    pub fn count(&self) -> usize {
        match self {
            SourceOutcome::Extracted { count } => *count,
            _ => 0,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SourceOutcome::Failed { .. } | SourceOutcome::Interrupted { .. }
        )
    }
}

impl fmt::Display for SourceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceOutcome::Extracted { count } => write!(f, "{count} events"),
            SourceOutcome::NoContent => write!(f, "0 events (no main content found)"),
            SourceOutcome::Failed { stage, reason } => {
                write!(f, "0 events (failed while {stage}: {reason})")
            }
            SourceOutcome::Interrupted { stage } => {
                write!(f, "0 events (interrupted while {stage})")
            }
            SourceOutcome::Skipped => write!(f, "skipped"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal stage transition {from} -> {to}")]
pub struct TransitionError {
    pub from: Stage,
    pub to: Stage,
}

/// Forward-only stage machine for one source.
///
/// `Pending -> Fetching -> Isolating -> Extracting -> Done`; any stage may jump
/// straight to `Done` when it fails, and `Done` is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRun {
    source: Source,
    stage: Stage,
    outcome: Option<SourceOutcome>,
}

impl SourceRun {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            stage: Stage::Pending,
            outcome: None,
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn outcome(&self) -> Option<&SourceOutcome> {
        self.outcome.as_ref()
    }

    /// Move to the next working stage. Stages cannot be skipped or revisited.
    pub fn advance(&mut self, next: Stage) -> Result<(), TransitionError> {
        let allowed = matches!(
            (self.stage, next),
            (Stage::Pending, Stage::Fetching)
                | (Stage::Fetching, Stage::Isolating)
                | (Stage::Isolating, Stage::Extracting)
        );
        if !allowed {
            return Err(TransitionError {
                from: self.stage,
                to: next,
            });
        }
        self.stage = next;
        Ok(())
    }

    /// Terminate the run with an outcome. Allowed from any non-terminal stage.
    pub fn finish(&mut self, outcome: SourceOutcome) -> Result<(), TransitionError> {
        if self.stage == Stage::Done {
            return Err(TransitionError {
                from: Stage::Done,
                to: Stage::Done,
            });
        }
        self.stage = Stage::Done;
        self.outcome = Some(outcome);
        Ok(())
    }

    pub fn into_report(self) -> SourceReport {
        SourceReport {
            source: self.source,
            outcome: self.outcome.unwrap_or(SourceOutcome::Skipped),
        }
    }
}

/// Final, immutable record of what happened to one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub source: Source,
    pub outcome: SourceOutcome,
}
