//! Gigcrawl engine: fetching, content isolation, extraction, scheduling and persistence.
mod decode;
mod engine;
mod extract;
mod fetch;
mod isolate;
mod persist;
mod progress;
mod schedule;
mod types;

pub use engine::{Engine, EngineConfig, EngineError, DEFAULT_OUTPUT_FILE};
pub use extract::{
    parse_extraction_payload, ChatCompletionExtractor, EventExtractor, ExtractionError,
    ExtractionSettings,
};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use isolate::{ContentIsolator, IsolatorError, DEFAULT_CONTENT_SELECTORS};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError, ResultWriter};
pub use progress::{LoggingProgressSink, ProgressSink};
pub use schedule::{CrawlReport, Scheduler, SourceJob, DEFAULT_DELAY};
pub use types::{ContentFragment, CrawlEvent, FailureKind, FetchError, RawPage};
