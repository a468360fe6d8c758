//! Command-line front end for gigcrawl: configuration, credential lookup,
//! signal handling and exit codes around the crawl engine.
pub mod app;
pub mod cli;
pub mod config;

pub use app::{run, Exit};
pub use cli::{Cli, LogTarget};
pub use config::{AppConfig, ConfigError, SourceEntry, DEFAULT_CONFIG_FILE, DEFAULT_SOURCES};
