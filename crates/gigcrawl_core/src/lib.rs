//! Gigcrawl core: pure domain types, the per-source stage machine and result aggregation.
mod aggregate;
mod event;
mod source;
mod state;
mod summary;

pub use aggregate::{Accumulator, ResultSet};
pub use event::{parse_event_date, DedupKey, EventCandidate, EventRecord};
pub use source::{Source, SourceError};
pub use state::{SourceOutcome, SourceReport, SourceRun, Stage, TransitionError};
pub use summary::RunSummary;
