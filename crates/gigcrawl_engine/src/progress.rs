use crawl_logging::{crawl_debug, crawl_info, crawl_warn};
use gigcrawl_core::SourceOutcome;

use crate::CrawlEvent;

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: CrawlEvent);
}

/// Writes every crawl event to the log, one line per transition.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingProgressSink;

impl ProgressSink for LoggingProgressSink {
    fn emit(&self, event: CrawlEvent) {
        match event {
            CrawlEvent::Stage {
                index,
                source,
                stage,
            } => {
                crawl_debug!("[{}] {} -> {}", index + 1, source, stage);
            }
            CrawlEvent::SourceFinished {
                index,
                source,
                outcome,
            } => match &outcome {
                SourceOutcome::Extracted { .. } | SourceOutcome::NoContent => {
                    crawl_info!("[{}] Found {} on {}", index + 1, outcome, source);
                }
                SourceOutcome::Skipped => {
                    crawl_info!("[{}] Skipped {}", index + 1, source);
                }
                SourceOutcome::Failed { .. } | SourceOutcome::Interrupted { .. } => {
                    crawl_warn!("[{}] {} on {}", index + 1, outcome, source);
                }
            },
            CrawlEvent::Waiting { delay_ms } => {
                crawl_info!(
                    "Waiting {:.1} seconds before next request...",
                    delay_ms as f64 / 1000.0
                );
            }
        }
    }
}
