use clap::Parser;
use tracing_subscriber::EnvFilter;

use block_flow::catalog::Catalog;
use block_flow::{example, list_blocks, run, schema, validate};

mod cli;

/// Environment variable holding the tracing filter, e.g. `block_flow=debug`.
const LOG_ENV: &str = "BLOCK_FLOW_LOG";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    let catalog = Catalog::standard();

    match cli.command {
        cli::Command::Schema => schema::run(),
        cli::Command::ListBlocks => list_blocks::run(&catalog),
        cli::Command::Example {
            template,
            symbol,
            timeframe,
        } => example::run(&catalog, &template, &symbol, &timeframe),
        cli::Command::Validate { file } => validate::run(&catalog, &file),
        cli::Command::Run {
            file,
            candles,
            output,
            max_depth,
            warmup,
        } => run::run(&catalog, &run::RunConfig {
            strategy_path: file,
            candles_path: candles,
            output,
            max_depth,
            warmup,
        }),
        cli::Command::Sweep {
            files,
            candles,
            output,
        } => run::sweep(&catalog, &files, &candles, output.as_deref()),
    }
}
