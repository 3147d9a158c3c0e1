pub mod context;
pub mod emit;
pub mod eval;
pub mod indicators;
pub mod program;
pub mod topo;

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::model::{BlockCategory, Candle, ExecutionSignal, Strategy};

use context::{ExecutionContext, Position};
use eval::Step;
use program::{CompiledBlock, Program};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("Block `{block_id}` is part of a same-step cycle")]
    CyclicGraph { block_id: String },

    #[error("Dependency chain through `{block_id}` is deeper than {max_depth} blocks")]
    DepthLimit { block_id: String, max_depth: usize },

    #[error("Block `{block_id}` has type `{block_type}` which the catalog does not know")]
    UnknownTemplate { block_id: String, block_type: String },
}

/// Result of one run over a candle series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub strategy_id: String,
    pub strategy_name: String,
    /// First candle index evaluated.
    pub warmup: usize,
    /// Number of steps actually evaluated.
    pub steps: usize,
    /// True if the run stopped early on the cancellation flag.
    pub cancelled: bool,
    pub position: Position,
    pub signals: Vec<ExecutionSignal>,
}

/// Compiles strategies against a catalog and runs them over candles.
///
/// Holds no per-run state: every run gets its own `ExecutionContext`, so
/// one engine can serve any number of runs, sequential or parallel.
pub struct Engine<'c> {
    catalog: &'c Catalog,
    config: EngineConfig,
}

impl<'c> Engine<'c> {
    pub fn new(catalog: &'c Catalog, config: EngineConfig) -> Self {
        Self { catalog, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Derive the execution order, parse every block and compute the
    /// warm-up offset.
    pub fn compile(&self, strategy: &Strategy) -> Result<Program, CompileError> {
        for block in strategy.blocks() {
            if !self.catalog.contains(&block.block_type) {
                return Err(CompileError::UnknownTemplate {
                    block_id: block.id.clone(),
                    block_type: block.block_type.clone(),
                });
            }
        }

        let order = topo::execution_order(strategy, self.config.max_depth)?;
        let blocks: Vec<CompiledBlock> = order
            .iter()
            .filter_map(|id| strategy.block(id))
            .map(|b| CompiledBlock::new(strategy, b))
            .collect();

        let lookback = blocks
            .iter()
            .filter(|b| b.enabled && b.category == BlockCategory::Indicator)
            .map(|b| b.kind.lookback())
            .max()
            .unwrap_or(0);
        let warmup = lookback.saturating_sub(1).max(self.config.min_warmup);

        tracing::debug!(
            strategy = %strategy.name,
            blocks = blocks.len(),
            warmup,
            "compiled strategy"
        );

        Ok(Program {
            strategy_id: strategy.id.clone(),
            strategy_name: strategy.name.clone(),
            blocks,
            warmup,
        })
    }

    /// Run a strategy over the whole candle series.
    pub fn run(&self, strategy: &Strategy, candles: &[Candle]) -> Result<RunReport, CompileError> {
        self.run_until(strategy, candles, &AtomicBool::new(false))
    }

    /// Run a strategy, checking `cancel` before every step. A cancelled run
    /// returns the signals emitted so far.
    pub fn run_until(
        &self,
        strategy: &Strategy,
        candles: &[Candle],
        cancel: &AtomicBool,
    ) -> Result<RunReport, CompileError> {
        let program = self.compile(strategy)?;
        Ok(execute(&program, candles, cancel))
    }
}

/// Step through `candles` from the program's warm-up offset.
pub fn execute(program: &Program, candles: &[Candle], cancel: &AtomicBool) -> RunReport {
    let mut ctx = ExecutionContext::default();
    let mut steps = 0;
    let mut cancelled = false;

    for t in program.warmup..candles.len() {
        if cancel.load(Ordering::Relaxed) {
            tracing::warn!(strategy = %program.strategy_name, index = t, "run cancelled");
            cancelled = true;
            break;
        }

        ctx.rotate(t);
        for block in program.blocks.iter().filter(|b| b.enabled) {
            let outputs = {
                let step = Step {
                    history: &candles[..=t],
                    current: &ctx.current,
                    previous: &ctx.previous,
                };
                eval::evaluate(block, &step)
            };
            ctx.current.insert(block.id.clone(), outputs);
        }
        emit::emit_signals(program, &candles[t], &mut ctx);
        steps += 1;
    }

    tracing::info!(
        strategy = %program.strategy_name,
        steps,
        signals = ctx.signals.len(),
        cancelled,
        "run finished"
    );

    RunReport {
        strategy_id: program.strategy_id.clone(),
        strategy_name: program.strategy_name.clone(),
        warmup: program.warmup,
        steps,
        cancelled,
        position: ctx.position,
        signals: ctx.signals,
    }
}
