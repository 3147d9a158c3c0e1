use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::block::BlockId;

/// What an execution signal asks the consumer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Buy,
    Sell,
    StopLoss,
    TakeProfit,
    Alert,
}

impl SignalKind {
    /// Signal kind emitted by an action block type.
    pub fn from_block_type(block_type: &str) -> Option<Self> {
        match block_type {
            "buy" => Some(SignalKind::Buy),
            "sell" => Some(SignalKind::Sell),
            "stop_loss" => Some(SignalKind::StopLoss),
            "take_profit" => Some(SignalKind::TakeProfit),
            "alert" => Some(SignalKind::Alert),
            _ => None,
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SignalKind::Buy => "buy",
            SignalKind::Sell => "sell",
            SignalKind::StopLoss => "stop_loss",
            SignalKind::TakeProfit => "take_profit",
            SignalKind::Alert => "alert",
        };
        f.write_str(s)
    }
}

/// A timestamped trade intent emitted by an action block. Never mutated
/// after emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExecutionSignal {
    pub kind: SignalKind,
    /// Close of the candle at which the trigger fired.
    pub price: f64,
    /// Candle time at which the trigger fired.
    pub timestamp: u64,
    /// Index of that candle in the input series.
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Action block that produced the signal.
    pub block_id: BlockId,
}
