use anyhow::Context;
use crawl_logging::{crawl_error, crawl_info, crawl_warn};
use gigcrawl_core::RunSummary;
use gigcrawl_engine::{Engine, EngineError};
use tokio_util::sync::CancellationToken;

use crate::cli::Cli;
use crate::config::{AppConfig, ConfigError};

/// How the process ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The run finished and the result file was written. Individual sources
    /// may still have failed.
    Success,
    /// The result file could not be written.
    Failure,
    /// Startup refused: bad configuration or missing credential.
    Config,
}

impl Exit {
    pub fn code(self) -> u8 {
        match self {
            Exit::Success => 0,
            Exit::Failure => 1,
            Exit::Config => 2,
        }
    }
}

/// Run one crawl and report the outcome on stdout/stderr.
///
/// `lookup_env` resolves the credential variable; the binary passes
/// `std::env::var`. Cancelling `cancel` stops the crawl at the next
/// suspension point; whatever was committed so far is still written.
pub async fn run<F>(cli: &Cli, lookup_env: F, cancel: CancellationToken) -> Exit
where
    F: Fn(&str) -> Option<String>,
{
    match execute(cli, lookup_env, cancel).await {
        Ok(summary) => {
            println!("{summary}");
            Exit::Success
        }
        Err(err) => {
            crawl_error!("{:#}", err);
            eprintln!("Error: {err:#}");
            classify(&err)
        }
    }
}

async fn execute<F>(
    cli: &Cli,
    lookup_env: F,
    cancel: CancellationToken,
) -> anyhow::Result<RunSummary>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    config.apply_cli(cli);

    let engine_config = config
        .into_engine_config(lookup_env)
        .context("preparing the crawl")?;
    crawl_info!(
        "Crawling {} sources, {:?} between requests, output {}",
        engine_config.jobs.len(),
        engine_config.delay,
        engine_config.output_path.display()
    );

    let engine = Engine::new(engine_config)
        .context("building the crawl engine")?
        .with_cancellation(cancel);
    let summary = engine.run().await.context("crawl did not complete")?;
    if summary.interrupted {
        crawl_warn!("Run was interrupted; partial results were saved");
    }
    Ok(summary)
}

fn classify(err: &anyhow::Error) -> Exit {
    if err.downcast_ref::<ConfigError>().is_some() {
        return Exit::Config;
    }
    match err.downcast_ref::<EngineError>() {
        // A client that cannot be built is a setup problem, not a crawl one.
        Some(EngineError::Client(_)) => Exit::Config,
        _ => Exit::Failure,
    }
}
