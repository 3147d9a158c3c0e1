use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One OHLCV bar. `time` is the bar open time in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Candle {
    pub time: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// A flat bar where every price equals `close`. Handy for synthetic series.
    pub fn flat(time: u64, close: f64) -> Self {
        Self {
            time,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }

    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Which candle field an indicator reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    Open,
    High,
    Low,
    Close,
    /// (high + low) / 2
    Hl2,
    /// (high + low + close) / 3
    Hlc3,
    Volume,
}

impl PriceSource {
    pub const NAMES: [&'static str; 7] = ["close", "open", "high", "low", "hl2", "hlc3", "volume"];

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "open" => Some(PriceSource::Open),
            "high" => Some(PriceSource::High),
            "low" => Some(PriceSource::Low),
            "close" => Some(PriceSource::Close),
            "hl2" => Some(PriceSource::Hl2),
            "hlc3" => Some(PriceSource::Hlc3),
            "volume" => Some(PriceSource::Volume),
            _ => None,
        }
    }

    pub fn of(self, c: &Candle) -> f64 {
        match self {
            PriceSource::Open => c.open,
            PriceSource::High => c.high,
            PriceSource::Low => c.low,
            PriceSource::Close => c.close,
            PriceSource::Hl2 => (c.high + c.low) / 2.0,
            PriceSource::Hlc3 => (c.high + c.low + c.close) / 3.0,
            PriceSource::Volume => c.volume,
        }
    }
}
