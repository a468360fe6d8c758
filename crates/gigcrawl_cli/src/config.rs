//! RON configuration for the `gigcrawl` binary.
//!
//! Every field is optional in the file; anything left out falls back to the
//! built-in defaults. Command-line flags are applied on top (see
//! [`AppConfig::apply_cli`]).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crawl_logging::{crawl_debug, crawl_info};
use gigcrawl_core::{Source, SourceError};
use gigcrawl_engine::{
    ContentIsolator, EngineConfig, ExtractionSettings, FetchSettings, IsolatorError, SourceJob,
    DEFAULT_CONTENT_SELECTORS, DEFAULT_OUTPUT_FILE,
};
use serde::Deserialize;

use crate::cli::Cli;

pub const DEFAULT_CONFIG_FILE: &str = "./gigcrawl.ron";

pub const DEFAULT_SOURCES: [&str; 3] = [
    "https://www.residentadvisor.net/events/de/berlin",
    "https://www.berghain.berlin/en/program/",
    "https://www.tresorberlin.com/events/",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file {0} does not exist")]
    NotFound(PathBuf),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid source: {0}")]
    InvalidSource(#[from] SourceError),
    #[error("invalid content selector: {0}")]
    InvalidSelector(#[from] IsolatorError),
    #[error("no sources configured")]
    NoSources,
    #[error("environment variable {var} is not set; the extraction service needs an API key")]
    MissingCredential { var: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sources: Vec<SourceEntry>,
    pub selectors: Vec<String>,
    pub delay_ms: u64,
    pub output_path: PathBuf,
    pub fetch: FetchConfig,
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceEntry {
    pub url: String,
    /// Replaces the global selector list for this source only.
    #[serde(default)]
    pub selectors: Option<Vec<String>>,
}

impl SourceEntry {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            selectors: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_bytes: u64,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub api_base_url: String,
    pub model: String,
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub max_fragment_chars: usize,
    pub temperature: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sources: DEFAULT_SOURCES.iter().copied().map(SourceEntry::new).collect(),
            selectors: DEFAULT_CONTENT_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            delay_ms: 2000,
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            fetch: FetchConfig::default(),
            extraction: ExtractionConfig::default(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        let settings = FetchSettings::default();
        Self {
            connect_timeout_secs: settings.connect_timeout.as_secs(),
            request_timeout_secs: settings.request_timeout.as_secs(),
            max_bytes: settings.max_bytes,
            user_agent: None,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        let settings = ExtractionSettings::new("");
        Self {
            api_base_url: settings.api_base_url,
            model: settings.model,
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: settings.timeout.as_secs(),
            max_fragment_chars: settings.max_fragment_chars,
            temperature: settings.temperature,
        }
    }
}

impl AppConfig {
    /// Load the configuration file.
    ///
    /// With `explicit` set, the file must exist. Otherwise
    /// [`DEFAULT_CONFIG_FILE`] is read when present and the built-in
    /// defaults are used when it is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                if explicit.is_some() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                crawl_debug!("No config file at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = Self::parse(&content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        crawl_info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        ron::from_str(content).map_err(|err| err.to_string())
    }

    /// Command-line flags win over file values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if !cli.sources.is_empty() {
            self.sources = cli.sources.iter().cloned().map(SourceEntry::new).collect();
        }
        if let Some(delay_ms) = cli.delay_ms {
            self.delay_ms = delay_ms;
        }
        if let Some(output) = &cli.output {
            self.output_path = output.clone();
        }
    }

    /// Resolve the credential and validate sources and selectors.
    ///
    /// The credential is checked first so a missing key is reported before
    /// anything else is looked at.
    pub fn into_engine_config<F>(self, lookup_env: F) -> Result<EngineConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup_env(&self.extraction.api_key_env)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingCredential {
                var: self.extraction.api_key_env.clone(),
            })?;

        if self.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }

        let isolator = ContentIsolator::new(self.selectors.as_slice())?;
        let jobs = self
            .sources
            .iter()
            .map(|entry| {
                let job = SourceJob::new(Source::parse(&entry.url)?);
                Ok(match &entry.selectors {
                    Some(selectors) => {
                        job.with_isolator(ContentIsolator::new(selectors.as_slice())?)
                    }
                    None => job,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let mut fetch = FetchSettings {
            connect_timeout: Duration::from_secs(self.fetch.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.fetch.request_timeout_secs),
            max_bytes: self.fetch.max_bytes,
            ..FetchSettings::default()
        };
        if let Some(user_agent) = self.fetch.user_agent {
            fetch.user_agent = user_agent;
        }

        let extraction = ExtractionSettings {
            api_base_url: self.extraction.api_base_url,
            model: self.extraction.model,
            timeout: Duration::from_secs(self.extraction.timeout_secs),
            max_fragment_chars: self.extraction.max_fragment_chars,
            temperature: self.extraction.temperature,
            ..ExtractionSettings::new(api_key)
        };

        Ok(EngineConfig {
            jobs,
            delay: Duration::from_millis(self.delay_ms),
            isolator,
            fetch,
            extraction,
            output_path: resolve_output_path(self.output_path),
        })
    }
}

/// Relative output paths are anchored at the working directory.
fn resolve_output_path(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(&path))
        .unwrap_or(path)
}
