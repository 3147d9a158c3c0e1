use crate::model::{
    BlockCategory, BlockId, BlockInstance, PortId, PriceSource, SignalKind, Strategy,
};

/// Comparison operator used by condition blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
}

impl CmpOp {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            ">" => Some(CmpOp::Gt),
            "<" => Some(CmpOp::Lt),
            ">=" => Some(CmpOp::Ge),
            "<=" => Some(CmpOp::Le),
            "==" => Some(CmpOp::Eq),
            "!=" => Some(CmpOp::Ne),
            _ => None,
        }
    }

    pub fn apply(self, a: f64, b: f64) -> bool {
        match self {
            CmpOp::Gt => a > b,
            CmpOp::Lt => a < b,
            CmpOp::Ge => a >= b,
            CmpOp::Le => a <= b,
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
        }
    }
}

/// Arithmetic operator used by the math block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Min,
    Max,
}

impl MathOp {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "add" => Some(MathOp::Add),
            "subtract" => Some(MathOp::Subtract),
            "multiply" => Some(MathOp::Multiply),
            "divide" => Some(MathOp::Divide),
            "min" => Some(MathOp::Min),
            "max" => Some(MathOp::Max),
            _ => None,
        }
    }

    /// `None` when the result is unavailable (division by zero).
    pub fn apply(self, a: f64, b: f64) -> Option<f64> {
        match self {
            MathOp::Add => Some(a + b),
            MathOp::Subtract => Some(a - b),
            MathOp::Multiply => Some(a * b),
            MathOp::Divide if b == 0.0 => None,
            MathOp::Divide => Some(a / b),
            MathOp::Min => Some(a.min(b)),
            MathOp::Max => Some(a.max(b)),
        }
    }
}

/// A block's transfer function with its parameters already parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Price,
    Sma { period: usize, source: PriceSource },
    Ema { period: usize, source: PriceSource },
    Rsi { period: usize, source: PriceSource },
    Bollinger { period: usize, std_dev: f64, source: PriceSource },
    Macd { fast: usize, slow: usize, signal: usize, source: PriceSource },
    Atr { period: usize },
    Threshold { op: CmpOp, threshold: f64 },
    Compare { op: CmpOp },
    Crossover,
    InRange { min: f64, max: f64 },
    BullishCandle,
    And,
    Or,
    Not,
    Consecutive { bars: usize },
    Constant { value: f64 },
    Math { op: MathOp },
    Previous,
    Action {
        kind: SignalKind,
        size: Option<f64>,
        message: Option<String>,
    },
    /// A catalog type with no built-in transfer function. Produces nothing.
    Opaque,
}

/// Largest period a block will honour. Anything above it never fills a
/// window anyway.
pub const MAX_PERIOD: usize = u32::MAX as usize;

/// Periods are clamped to `1..=MAX_PERIOD` so evaluation stays total for
/// any parameter value the document accepted.
fn count(block: &BlockInstance, name: &str, fallback: usize) -> usize {
    match block.number(name) {
        Some(v) if v.is_finite() => v.round().clamp(1.0, MAX_PERIOD as f64) as usize,
        _ => fallback,
    }
}

fn source(block: &BlockInstance) -> PriceSource {
    block
        .text("source")
        .and_then(PriceSource::parse)
        .unwrap_or(PriceSource::Close)
}

fn cmp(block: &BlockInstance) -> CmpOp {
    block.text("operator").and_then(CmpOp::parse).unwrap_or(CmpOp::Gt)
}

impl BlockKind {
    pub fn from_instance(block: &BlockInstance) -> Self {
        match block.block_type.as_str() {
            "price" => BlockKind::Price,
            "sma" => BlockKind::Sma {
                period: count(block, "period", 14),
                source: source(block),
            },
            "ema" => BlockKind::Ema {
                period: count(block, "period", 14),
                source: source(block),
            },
            "rsi" => BlockKind::Rsi {
                period: count(block, "period", 14),
                source: source(block),
            },
            "bollinger" => BlockKind::Bollinger {
                period: count(block, "period", 20),
                std_dev: block.number("std_dev").unwrap_or(2.0),
                source: source(block),
            },
            "macd" => BlockKind::Macd {
                fast: count(block, "fast", 12),
                slow: count(block, "slow", 26),
                signal: count(block, "signal", 9),
                source: source(block),
            },
            "atr" => BlockKind::Atr {
                period: count(block, "period", 14),
            },
            "threshold" => BlockKind::Threshold {
                op: cmp(block),
                threshold: block.number("threshold").unwrap_or(0.0),
            },
            "compare" => BlockKind::Compare { op: cmp(block) },
            "crossover" => BlockKind::Crossover,
            "in_range" => BlockKind::InRange {
                min: block.number("min").unwrap_or(0.0),
                max: block.number("max").unwrap_or(100.0),
            },
            "bullish_candle" => BlockKind::BullishCandle,
            "and" => BlockKind::And,
            "or" => BlockKind::Or,
            "not" => BlockKind::Not,
            "consecutive" => BlockKind::Consecutive {
                bars: count(block, "bars", 3),
            },
            "constant" => BlockKind::Constant {
                value: block.number("value").unwrap_or(0.0),
            },
            "math" => BlockKind::Math {
                op: block
                    .text("operator")
                    .and_then(MathOp::parse)
                    .unwrap_or(MathOp::Add),
            },
            "previous" => BlockKind::Previous,
            other => match SignalKind::from_block_type(other) {
                Some(kind) => BlockKind::Action {
                    kind,
                    size: block.number("size"),
                    message: block.text("message").map(str::to_string),
                },
                None => BlockKind::Opaque,
            },
        }
    }

    /// Candles of history this block needs before its first valid output.
    pub fn lookback(&self) -> usize {
        match self {
            BlockKind::Price => 1,
            BlockKind::Sma { period, .. }
            | BlockKind::Ema { period, .. }
            | BlockKind::Bollinger { period, .. } => *period,
            BlockKind::Rsi { period, .. } | BlockKind::Atr { period } => period.saturating_add(1),
            BlockKind::Macd { fast, slow, .. } => (*fast).max(*slow),
            _ => 0,
        }
    }
}

/// Where a bound input reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortRef {
    pub block: BlockId,
    pub port: PortId,
}

/// A block ready for evaluation: parsed transfer function plus its inputs
/// resolved to source ports.
#[derive(Debug, Clone)]
pub struct CompiledBlock {
    pub id: BlockId,
    pub block_type: String,
    pub category: BlockCategory,
    pub enabled: bool,
    pub kind: BlockKind,
    pub inputs: Vec<(PortId, Option<PortRef>)>,
}

impl CompiledBlock {
    pub fn new(strategy: &Strategy, block: &BlockInstance) -> Self {
        let inputs = block
            .inputs
            .iter()
            .map(|port| {
                let source = port
                    .bound
                    .as_deref()
                    .and_then(|id| strategy.connection(id))
                    .map(|c| PortRef {
                        block: c.source_block.clone(),
                        port: c.source_port.clone(),
                    });
                (port.spec.id.clone(), source)
            })
            .collect();

        Self {
            id: block.id.clone(),
            block_type: block.block_type.clone(),
            category: block.category,
            enabled: block.enabled,
            kind: BlockKind::from_instance(block),
            inputs,
        }
    }

    pub fn source_of(&self, port_id: &str) -> Option<&PortRef> {
        self.inputs
            .iter()
            .find(|(id, _)| id == port_id)
            .and_then(|(_, source)| source.as_ref())
    }
}

/// A strategy compiled into a linear program.
#[derive(Debug, Clone)]
pub struct Program {
    pub strategy_id: String,
    pub strategy_name: String,
    /// Blocks in execution order.
    pub blocks: Vec<CompiledBlock>,
    /// First candle index evaluated.
    pub warmup: usize,
}

impl Program {
    pub fn execution_order(&self) -> Vec<&str> {
        self.blocks.iter().map(|b| b.id.as_str()).collect()
    }

    pub fn actions(&self) -> impl Iterator<Item = &CompiledBlock> {
        self.blocks
            .iter()
            .filter(|b| b.enabled && b.category == BlockCategory::Action)
    }
}
