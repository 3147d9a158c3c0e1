use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::{BlockId, Candle, ExecutionSignal, SignalKind};

/// A value flowing through a port during one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PortValue {
    Number(f64),
    Boolean(bool),
    Candle(Candle),
    Signal(bool),
}

impl PortValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PortValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Booleans and signals are both truthy values; anything else is inert.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PortValue::Boolean(v) | PortValue::Signal(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_candle(&self) -> Option<&Candle> {
        match self {
            PortValue::Candle(c) => Some(c),
            _ => None,
        }
    }
}

/// Everything one block produced in one step: its output ports plus the
/// one-slot memory cell stateful blocks carry to the next step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockOutputs {
    pub ports: BTreeMap<String, PortValue>,
    pub memory: BTreeMap<&'static str, f64>,
}

impl BlockOutputs {
    pub fn set(&mut self, port: &str, value: PortValue) {
        self.ports.insert(port.to_string(), value);
    }

    pub fn number(&mut self, port: &str, value: f64) {
        self.set(port, PortValue::Number(value));
    }

    pub fn boolean(&mut self, port: &str, value: bool) {
        self.set(port, PortValue::Boolean(value));
    }

    pub fn remember(&mut self, slot: &'static str, value: f64) {
        self.memory.insert(slot, value);
    }
}

/// Outputs of every evaluated block for one step, keyed by block id.
#[derive(Debug, Clone, Default)]
pub struct StepOutputs {
    inner: HashMap<BlockId, BlockOutputs>,
}

impl StepOutputs {
    pub fn get(&self, block_id: &str) -> Option<&BlockOutputs> {
        self.inner.get(block_id)
    }

    pub fn port(&self, block_id: &str, port_id: &str) -> Option<PortValue> {
        self.inner.get(block_id)?.ports.get(port_id).copied()
    }

    pub fn memory(&self, block_id: &str, slot: &str) -> Option<f64> {
        self.inner.get(block_id)?.memory.get(slot).copied()
    }

    pub fn insert(&mut self, block_id: BlockId, outputs: BlockOutputs) {
        self.inner.insert(block_id, outputs);
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Side of the minimal position record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    #[default]
    Flat,
    Long,
    Short,
}

/// Minimal inventory record kept alongside the signal log. Consumers that
/// need real bookkeeping track it themselves from the signal stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub side: PositionSide,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_price: Option<f64>,
    pub size: f64,
}

impl Position {
    /// Apply an emitted signal.
    ///
    /// buy: short → flat, flat → long. sell: long → flat, flat → short.
    /// Stops and targets flatten. Alerts and same-side repeats are no-ops.
    pub fn apply(&mut self, signal: &ExecutionSignal) {
        let size = signal.size.unwrap_or(0.0);
        match (signal.kind, self.side) {
            (SignalKind::Buy, PositionSide::Short) | (SignalKind::Sell, PositionSide::Long) => {
                *self = Position::default();
            }
            (SignalKind::Buy, PositionSide::Flat) => {
                *self = Position {
                    side: PositionSide::Long,
                    entry_price: Some(signal.price),
                    size,
                };
            }
            (SignalKind::Sell, PositionSide::Flat) => {
                *self = Position {
                    side: PositionSide::Short,
                    entry_price: Some(signal.price),
                    size,
                };
            }
            (SignalKind::StopLoss | SignalKind::TakeProfit, _) => {
                *self = Position::default();
            }
            _ => {}
        }
    }
}

/// Per-run state. Owned by exactly one run and never shared.
#[derive(Debug, Default)]
pub struct ExecutionContext {
    /// Index of the candle being evaluated.
    pub index: usize,
    pub current: StepOutputs,
    pub previous: StepOutputs,
    pub position: Position,
    pub signals: Vec<ExecutionSignal>,
}

impl ExecutionContext {
    /// Start step `index`: the finished step becomes `previous` and
    /// `current` starts empty.
    pub fn rotate(&mut self, index: usize) {
        self.index = index;
        self.previous = std::mem::take(&mut self.current);
    }

    pub fn emit(&mut self, signal: ExecutionSignal) {
        self.position.apply(&signal);
        self.signals.push(signal);
    }
}
