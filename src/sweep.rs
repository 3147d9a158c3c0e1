use std::sync::atomic::AtomicBool;

use rayon::prelude::*;

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::engine::{CompileError, Engine, RunReport};
use crate::model::{Candle, Strategy};

/// One independent run: a strategy over a candle series.
pub struct SweepJob<'a> {
    pub strategy: &'a Strategy,
    pub candles: &'a [Candle],
}

/// Run every job in parallel. Each run owns its own execution context; the
/// catalog and the strategies are only read. Results are in job order.
pub fn run_all(
    catalog: &Catalog,
    jobs: &[SweepJob<'_>],
    config: EngineConfig,
    cancel: &AtomicBool,
) -> Vec<Result<RunReport, CompileError>> {
    let engine = Engine::new(catalog, config);
    jobs.par_iter()
        .map(|job| engine.run_until(job.strategy, job.candles, cancel))
        .collect()
}
