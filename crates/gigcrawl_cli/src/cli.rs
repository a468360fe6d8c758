use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use crawl_logging::{LogDestination, LogSettings, DEFAULT_LOG_FILE};
use log::LevelFilter;

#[derive(Debug, Parser)]
#[command(name = "gigcrawl")]
#[command(version)]
#[command(about = "Crawl concert listing pages and collect the events into one JSON file")]
pub struct Cli {
    /// RON configuration file (default: ./gigcrawl.ron, if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Where to write the event list
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pause between two sources, in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Listing page to crawl; repeat for several. Replaces the configured sources.
    #[arg(long = "source", value_name = "URL")]
    pub sources: Vec<String>,

    /// Log file used by the `file` and `both` destinations
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    pub log_destination: LogTarget,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl Cli {
    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            destination: match self.log_destination {
                LogTarget::Terminal => LogDestination::Terminal,
                LogTarget::File => LogDestination::File,
                LogTarget::Both => LogDestination::Both,
            },
            level: if self.verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
            file_path: self
                .log_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        }
    }
}
