//! Window statistics over the candle history. Every function receives the
//! series up to and including the current candle and returns `None` when
//! the window is not full yet.

use crate::model::{Candle, PriceSource};

fn window(history: &[Candle], period: usize) -> Option<&[Candle]> {
    if period == 0 || history.len() < period {
        return None;
    }
    Some(&history[history.len() - period..])
}

/// Arithmetic mean of the last `period` values.
pub fn sma(history: &[Candle], period: usize, source: PriceSource) -> Option<f64> {
    let w = window(history, period)?;
    Some(w.iter().map(|c| source.of(c)).sum::<f64>() / period as f64)
}

/// Population standard deviation of the last `period` values.
pub fn stddev(history: &[Candle], period: usize, source: PriceSource) -> Option<f64> {
    let mean = sma(history, period, source)?;
    let w = window(history, period)?;
    let var = w
        .iter()
        .map(|c| {
            let d = source.of(c) - mean;
            d * d
        })
        .sum::<f64>()
        / period as f64;
    Some(var.sqrt())
}

/// One EMA step. Without a previous value the EMA seeds from the SMA of
/// the current window.
pub fn ema_step(
    history: &[Candle],
    period: usize,
    source: PriceSource,
    prev: Option<f64>,
) -> Option<f64> {
    match prev {
        Some(prev) => {
            let x = source.of(history.last()?);
            let k = 2.0 / (period as f64 + 1.0);
            Some(prev + k * (x - prev))
        }
        None => sma(history, period, source),
    }
}

/// Wilder-smoothed average gain and loss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RsiState {
    pub avg_gain: f64,
    pub avg_loss: f64,
}

impl RsiState {
    pub fn value(&self) -> f64 {
        if self.avg_loss == 0.0 {
            if self.avg_gain == 0.0 { 50.0 } else { 100.0 }
        } else {
            let rs = self.avg_gain / self.avg_loss;
            100.0 - 100.0 / (1.0 + rs)
        }
    }
}

/// One RSI step. Seeds from plain averages of the last `period` changes.
pub fn rsi_step(
    history: &[Candle],
    period: usize,
    source: PriceSource,
    prev: Option<RsiState>,
) -> Option<RsiState> {
    match prev {
        Some(prev) => {
            let n = history.len();
            if n < 2 {
                return None;
            }
            let change = source.of(&history[n - 1]) - source.of(&history[n - 2]);
            let p = period as f64;
            Some(RsiState {
                avg_gain: (prev.avg_gain * (p - 1.0) + change.max(0.0)) / p,
                avg_loss: (prev.avg_loss * (p - 1.0) + (-change).max(0.0)) / p,
            })
        }
        None => {
            let w = window(history, period.checked_add(1)?)?;
            let (gain, loss) = w.windows(2).fold((0.0, 0.0), |(g, l), pair| {
                let change = source.of(&pair[1]) - source.of(&pair[0]);
                (g + change.max(0.0), l + (-change).max(0.0))
            });
            Some(RsiState {
                avg_gain: gain / period as f64,
                avg_loss: loss / period as f64,
            })
        }
    }
}

/// True range of the last candle. The first candle of a series has no
/// previous close and uses high - low.
pub fn true_range(history: &[Candle]) -> Option<f64> {
    let n = history.len();
    let last = history.last()?;
    if n == 1 {
        Some(last.high - last.low)
    } else {
        Some(last.true_range(history[n - 2].close))
    }
}

/// One ATR step. Seeds from the mean true range of the last `period` candles.
pub fn atr_step(history: &[Candle], period: usize, prev: Option<f64>) -> Option<f64> {
    match prev {
        Some(prev) => {
            let tr = true_range(history)?;
            let p = period as f64;
            Some((prev * (p - 1.0) + tr) / p)
        }
        None => {
            if period == 0 || history.len() < period {
                return None;
            }
            let start = history.len() - period;
            let sum: f64 = (start..history.len())
                .filter_map(|i| true_range(&history[..=i]))
                .sum();
            Some(sum / period as f64)
        }
    }
}
