use anyhow::{Context, Result};

pub const MAX_DEPTH_ENV: &str = "BLOCK_FLOW_MAX_DEPTH";
pub const MIN_WARMUP_ENV: &str = "BLOCK_FLOW_WARMUP";

/// Tuning knobs shared by every run an engine performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Longest dependency chain the compiler follows before giving up.
    pub max_depth: usize,
    /// Lower bound on the first evaluated candle index. The engine never
    /// starts before the indicators' own warm-up regardless.
    pub min_warmup: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: 1024,
            min_warmup: 0,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `BLOCK_FLOW_MAX_DEPTH` / `BLOCK_FLOW_WARMUP`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(v) = read_env(MAX_DEPTH_ENV)? {
            config.max_depth = v;
        }
        if let Some(v) = read_env(MIN_WARMUP_ENV)? {
            config.min_warmup = v;
        }
        Ok(config)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_min_warmup(mut self, min_warmup: usize) -> Self {
        self.min_warmup = min_warmup;
        self
    }
}

fn read_env(name: &str) -> Result<Option<usize>> {
    match std::env::var(name) {
        Ok(raw) => {
            let v = raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("{name} must be a non-negative integer, got '{raw}'"))?;
            Ok(Some(v))
        }
        Err(_) => Ok(None),
    }
}
