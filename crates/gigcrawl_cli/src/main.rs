use std::process::ExitCode;

use clap::Parser;
use crawl_logging::crawl_warn;
use gigcrawl_cli::Cli;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    crawl_logging::initialize(&cli.log_settings());

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            crawl_warn!("Interrupt received, stopping after saving what was collected");
            on_signal.cancel();
        }
    });

    let exit = gigcrawl_cli::run(&cli, |name| std::env::var(name).ok(), cancel).await;
    ExitCode::from(exit.code())
}
