use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::data;
use crate::engine::{Engine, RunReport};
use crate::exchange;
use crate::model::Strategy;
use crate::sweep::{self, SweepJob};
use crate::validate;

/// Configuration for a single `run` invocation.
pub struct RunConfig {
    pub strategy_path: PathBuf,
    pub candles_path: PathBuf,
    pub output: Option<PathBuf>,
    pub max_depth: Option<usize>,
    pub warmup: Option<usize>,
}

/// Load, validate and rebuild a strategy from a JSON file.
pub fn load_strategy(catalog: &Catalog, path: &Path) -> Result<Strategy> {
    let doc = validate::load_and_validate(catalog, path).map_err(|errors| {
        let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        anyhow::anyhow!(
            "Strategy {} failed validation:\n  {}",
            path.display(),
            msgs.join("\n  ")
        )
    })?;
    exchange::import(catalog, &doc).with_context(|| format!("rebuilding {}", path.display()))
}

/// Cancellation flag flipped by Ctrl-C. A second Ctrl-C is left to the
/// default handler.
fn cancel_on_ctrlc() -> Result<Arc<AtomicBool>> {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
        eprintln!("Cancelling run...");
    })
    .context("installing Ctrl-C handler")?;
    Ok(cancel)
}

/// Entry point for the `run` subcommand.
pub fn run(catalog: &Catalog, config: &RunConfig) -> Result<()> {
    let mut engine_config = EngineConfig::from_env()?;
    if let Some(depth) = config.max_depth {
        engine_config = engine_config.with_max_depth(depth);
    }
    if let Some(warmup) = config.warmup {
        engine_config = engine_config.with_min_warmup(warmup);
    }

    let strategy = load_strategy(catalog, &config.strategy_path)?;
    let candles = data::load_candles(&config.candles_path)?;
    tracing::info!(
        strategy = %strategy.name,
        candles = candles.len(),
        "starting run"
    );

    let cancel = cancel_on_ctrlc()?;
    let engine = Engine::new(catalog, engine_config);
    let report = engine.run_until(&strategy, &candles, &cancel)?;

    print_report(&report);

    if let Some(ref path) = config.output {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        println!("  Report written to {}", path.display());
    }

    Ok(())
}

/// Entry point for the `sweep` subcommand.
pub fn sweep(
    catalog: &Catalog,
    files: &[PathBuf],
    candles_path: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let config = EngineConfig::from_env()?;
    let strategies = files
        .iter()
        .map(|f| load_strategy(catalog, f))
        .collect::<Result<Vec<_>>>()?;
    let candles = data::load_candles(candles_path)?;

    let jobs: Vec<SweepJob<'_>> = strategies
        .iter()
        .map(|strategy| SweepJob {
            strategy,
            candles: &candles,
        })
        .collect();

    let cancel = cancel_on_ctrlc()?;
    let mut reports = Vec::with_capacity(jobs.len());
    let mut failed = 0;
    for (file, result) in files.iter().zip(sweep::run_all(catalog, &jobs, config, &cancel)) {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                failed += 1;
                eprintln!("  {}: {e}", file.display());
            }
        }
    }

    print_summary(&reports);

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&reports)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        println!("  Reports written to {}", path.display());
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} strategies failed to compile", files.len());
    }
    Ok(())
}

// ── Output ──────────────────────────────────────────────────────────

fn print_report(report: &RunReport) {
    println!("\n{}", "═".repeat(78));
    println!("  {} ({})", report.strategy_name, report.strategy_id);
    println!("{}", "═".repeat(78));
    println!(
        "  {:>6}  {:>12}  {:<12}  {:>12}  {:>8}  {}",
        "Index", "Time", "Signal", "Price", "Size", "Message"
    );
    println!("  {}", "-".repeat(74));
    for s in &report.signals {
        println!(
            "  {:>6}  {:>12}  {:<12}  {:>12.4}  {:>8}  {}",
            s.index,
            s.timestamp,
            s.kind.to_string(),
            s.price,
            s.size.map(|v| format!("{v:.4}")).unwrap_or_default(),
            s.message.as_deref().unwrap_or("")
        );
    }
    println!("{}", "═".repeat(78));
    println!(
        "  warm-up {}, {} steps, {} signals, position {:?}{}",
        report.warmup,
        report.steps,
        report.signals.len(),
        report.position.side,
        if report.cancelled { " (cancelled)" } else { "" }
    );
}

fn print_summary(reports: &[RunReport]) {
    println!("\n{}", "═".repeat(78));
    println!("  Sweep Results ({} strategies)", reports.len());
    println!("{}", "═".repeat(78));
    println!(
        "  {:<36}  {:>8}  {:>8}  {:>8}  {:>8}",
        "Strategy", "Warm-up", "Steps", "Signals", "Position"
    );
    println!("  {}", "-".repeat(74));
    for r in reports {
        println!(
            "  {:<36}  {:>8}  {:>8}  {:>8}  {:>8}",
            r.strategy_name,
            r.warmup,
            r.steps,
            r.signals.len(),
            format!("{:?}", r.position.side)
        );
    }
    println!("{}", "═".repeat(78));
}
