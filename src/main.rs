use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    readlog::logging::init().context("init logging")?;

    let cli = readlog::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        readlog::cli::Command::Check(args) => {
            readlog::check::run(args).context("check")?;
        }
        readlog::cli::Command::Export(args) => {
            readlog::export::run(args).context("export")?;
        }
        readlog::cli::Command::Views(args) => {
            readlog::check::views(args).await.context("views")?;
        }
    }

    Ok(())
}
