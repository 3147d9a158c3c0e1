use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Block-graph strategy engine. Validate strategy documents and run them
/// over candle data to produce trade signals.
#[derive(Parser)]
#[command(name = "block-flow", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Output the JSON schema for strategy documents
    Schema,

    /// List all available block types with their parameters and ports
    ListBlocks,

    /// Output an example strategy document built from a template
    Example {
        /// Template name: ma_crossover, rsi_reversal or bollinger_breakout
        #[arg(long, default_value = "ma_crossover")]
        template: String,

        /// Symbol to scope the strategy to
        #[arg(long, default_value = "BTC/USDT")]
        symbol: String,

        /// Candle timeframe
        #[arg(long, default_value = "1h")]
        timeframe: String,
    },

    /// Validate a strategy JSON file
    Validate {
        /// Path to the strategy JSON file
        file: PathBuf,
    },

    /// Run a strategy over a candle CSV and print the signals
    Run {
        /// Path to the strategy JSON file
        file: PathBuf,

        /// CSV file with time,open,high,low,close,volume columns
        #[arg(long)]
        candles: PathBuf,

        /// Write the run report as JSON to this file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Maximum dependency depth the compiler follows
        #[arg(long)]
        max_depth: Option<usize>,

        /// Never start evaluating before this candle index
        #[arg(long)]
        warmup: Option<usize>,
    },

    /// Run several strategies over the same candles in parallel
    Sweep {
        /// Strategy JSON files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// CSV file with time,open,high,low,close,volume columns
        #[arg(long)]
        candles: PathBuf,

        /// Write all run reports as a JSON array to this file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}
