use crate::model::Candle;

use super::context::{BlockOutputs, PortValue, StepOutputs};
use super::indicators::{self, RsiState};
use super::program::{BlockKind, CompiledBlock};

/// Read-only view of the run state a block sees while it is evaluated.
pub struct Step<'a> {
    /// Candles up to and including the current one.
    pub history: &'a [Candle],
    /// Outputs of blocks already evaluated this step.
    pub current: &'a StepOutputs,
    /// Outputs of every block as of the previous step.
    pub previous: &'a StepOutputs,
}

impl Step<'_> {
    /// Current value feeding `port`, or `None` if unbound or not produced.
    fn input(&self, block: &CompiledBlock, port: &str) -> Option<PortValue> {
        let src = block.source_of(port)?;
        self.current.port(&src.block, &src.port)
    }

    /// Value that fed `port` one step ago.
    fn previous_input(&self, block: &CompiledBlock, port: &str) -> Option<PortValue> {
        let src = block.source_of(port)?;
        self.previous.port(&src.block, &src.port)
    }

    fn number(&self, block: &CompiledBlock, port: &str) -> Option<f64> {
        self.input(block, port)?.as_number()
    }

    fn boolean(&self, block: &CompiledBlock, port: &str) -> Option<bool> {
        self.input(block, port)?.as_bool()
    }

    fn own_port(&self, block: &CompiledBlock, port: &str) -> Option<f64> {
        self.previous.port(&block.id, port)?.as_number()
    }

    fn own_memory(&self, block: &CompiledBlock, slot: &str) -> Option<f64> {
        self.previous.memory(&block.id, slot)
    }
}

/// Apply a block's transfer function for one step.
///
/// Never fails. A block reading an undefined input stays inert: conditions
/// come out false and arithmetic leaves its output unset.
pub fn evaluate(block: &CompiledBlock, step: &Step<'_>) -> BlockOutputs {
    let mut out = BlockOutputs::default();

    match &block.kind {
        BlockKind::Price => {
            if let Some(c) = step.history.last() {
                out.number("open", c.open);
                out.number("high", c.high);
                out.number("low", c.low);
                out.number("close", c.close);
                out.number("volume", c.volume);
                out.set("candle", PortValue::Candle(*c));
            }
        }
        BlockKind::Sma { period, source } => {
            if let Some(v) = indicators::sma(step.history, *period, *source) {
                out.number("value", v);
            }
        }
        BlockKind::Ema { period, source } => {
            let prev = step.own_port(block, "value");
            if let Some(v) = indicators::ema_step(step.history, *period, *source, prev) {
                out.number("value", v);
            }
        }
        BlockKind::Rsi { period, source } => {
            let prev = match (
                step.own_memory(block, "avg_gain"),
                step.own_memory(block, "avg_loss"),
            ) {
                (Some(avg_gain), Some(avg_loss)) => Some(RsiState { avg_gain, avg_loss }),
                _ => None,
            };
            if let Some(state) = indicators::rsi_step(step.history, *period, *source, prev) {
                out.remember("avg_gain", state.avg_gain);
                out.remember("avg_loss", state.avg_loss);
                out.number("value", state.value());
            }
        }
        BlockKind::Bollinger {
            period,
            std_dev,
            source,
        } => {
            if let (Some(mid), Some(sd)) = (
                indicators::sma(step.history, *period, *source),
                indicators::stddev(step.history, *period, *source),
            ) {
                out.number("upper", mid + std_dev * sd);
                out.number("middle", mid);
                out.number("lower", mid - std_dev * sd);
            }
        }
        BlockKind::Macd {
            fast,
            slow,
            signal,
            source,
        } => {
            let fast_ema =
                indicators::ema_step(step.history, *fast, *source, step.own_memory(block, "fast"));
            let slow_ema =
                indicators::ema_step(step.history, *slow, *source, step.own_memory(block, "slow"));
            if let Some(f) = fast_ema {
                out.remember("fast", f);
            }
            if let Some(s) = slow_ema {
                out.remember("slow", s);
            }
            if let (Some(f), Some(s)) = (fast_ema, slow_ema) {
                let macd = f - s;
                let signal_line = match step.own_port(block, "signal") {
                    Some(prev) => prev + 2.0 / (*signal as f64 + 1.0) * (macd - prev),
                    None => macd,
                };
                out.number("macd", macd);
                out.number("signal", signal_line);
                out.number("histogram", macd - signal_line);
            }
        }
        BlockKind::Atr { period } => {
            let prev = step.own_memory(block, "atr");
            if let Some(v) = indicators::atr_step(step.history, *period, prev) {
                out.remember("atr", v);
                out.number("value", v);
            }
        }
        BlockKind::Threshold { op, threshold } => {
            let result = step
                .number(block, "value")
                .is_some_and(|v| op.apply(v, *threshold));
            out.boolean("result", result);
        }
        BlockKind::Compare { op } => {
            let result = match (step.number(block, "a"), step.number(block, "b")) {
                (Some(a), Some(b)) => op.apply(a, b),
                _ => false,
            };
            out.boolean("result", result);
        }
        BlockKind::Crossover => {
            let now = (step.number(block, "fast"), step.number(block, "slow"));
            let before = (
                step.previous_input(block, "fast").and_then(|v| v.as_number()),
                step.previous_input(block, "slow").and_then(|v| v.as_number()),
            );
            let (up, down) = match (now, before) {
                ((Some(f), Some(s)), (Some(pf), Some(ps))) => {
                    (pf <= ps && f > s, pf >= ps && f < s)
                }
                _ => (false, false),
            };
            out.boolean("cross_up", up);
            out.boolean("cross_down", down);
        }
        BlockKind::InRange { min, max } => {
            let result = step
                .number(block, "value")
                .is_some_and(|v| v >= *min && v <= *max);
            out.boolean("result", result);
        }
        BlockKind::BullishCandle => {
            let result = step
                .input(block, "candle")
                .and_then(|v| v.as_candle().map(|c| c.close > c.open))
                .unwrap_or(false);
            out.boolean("result", result);
        }
        BlockKind::And => {
            let result =
                step.boolean(block, "a") == Some(true) && step.boolean(block, "b") == Some(true);
            out.boolean("result", result);
        }
        BlockKind::Or => {
            let result =
                step.boolean(block, "a") == Some(true) || step.boolean(block, "b") == Some(true);
            out.boolean("result", result);
        }
        BlockKind::Not => {
            if let Some(v) = step.boolean(block, "input") {
                out.boolean("result", !v);
            }
        }
        BlockKind::Consecutive { bars } => {
            let count = if step.boolean(block, "condition") == Some(true) {
                step.own_port(block, "count").unwrap_or(0.0) + 1.0
            } else {
                0.0
            };
            out.number("count", count);
            out.boolean("result", count >= *bars as f64);
        }
        BlockKind::Constant { value } => {
            out.number("value", *value);
        }
        BlockKind::Math { op } => {
            if let (Some(a), Some(b)) = (step.number(block, "a"), step.number(block, "b")) {
                if let Some(v) = op.apply(a, b) {
                    out.number("result", v);
                }
            }
        }
        BlockKind::Previous => {
            if let Some(v) = step.previous_input(block, "value") {
                out.set("value", v);
            }
        }
        BlockKind::Action { .. } => {
            let fired = step.boolean(block, "trigger") == Some(true);
            out.set("fired", PortValue::Signal(fired));
        }
        BlockKind::Opaque => {}
    }

    out
}
