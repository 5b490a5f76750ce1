use anyhow::Result;
use clap::Parser;
use travelpen::cli;

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("travelpen={}", level).into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    let command = args.command();
    let config = args.into_config()?;

    init_logging(config.verbose);

    cli::run(command, config).await
}
