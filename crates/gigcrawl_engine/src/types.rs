use std::fmt;

use gigcrawl_core::{Source, SourceOutcome, Stage};

/// HTML text retrieved for a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    pub source: Source,
    pub final_url: String,
    pub html: String,
    pub encoding: String,
}

/// Markup of the region judged to hold the event listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFragment {
    /// Selector that produced the match.
    pub selector: String,
    pub html: String,
}

/// Progress notifications emitted by the scheduler, in strict source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    Stage {
        index: usize,
        source: Source,
        stage: Stage,
    },
    SourceFinished {
        index: usize,
        source: Source,
        outcome: SourceOutcome,
    },
    Waiting {
        delay_ms: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("fetching {url} failed: {kind} ({message})")]
pub struct FetchError {
    pub url: String,
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(url: impl Into<String>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
