//! Ready-made strategy topologies, built only from the regular document
//! operations.

use crate::catalog::Catalog;
use crate::model::{BlockId, DocumentError, Placement, Strategy};

/// Names accepted by [`by_name`].
pub const TEMPLATE_NAMES: [&str; 3] = ["ma_crossover", "rsi_reversal", "bollinger_breakout"];

fn add(
    strategy: &mut Strategy,
    catalog: &Catalog,
    block_type: &str,
    x: f64,
    y: f64,
) -> Result<BlockId, DocumentError> {
    Ok(strategy
        .add_block(catalog, block_type, Placement::new(x, y))?
        .id
        .clone())
}

/// Buy when the fast SMA crosses above the slow SMA, sell when it crosses
/// back below.
pub fn ma_crossover(
    catalog: &Catalog,
    name: &str,
    symbol: &str,
    timeframe: &str,
    fast: usize,
    slow: usize,
) -> Result<Strategy, DocumentError> {
    let mut s = Strategy::new(name, symbol, timeframe);

    let fast_ma = add(&mut s, catalog, "sma", 0.0, 0.0)?;
    s.update_block_parameter(&fast_ma, "period", fast as f64)?;
    let slow_ma = add(&mut s, catalog, "sma", 0.0, 120.0)?;
    s.update_block_parameter(&slow_ma, "period", slow as f64)?;

    let cross = add(&mut s, catalog, "crossover", 240.0, 60.0)?;
    let buy = add(&mut s, catalog, "buy", 480.0, 0.0)?;
    let sell = add(&mut s, catalog, "sell", 480.0, 120.0)?;

    s.create_connection(&fast_ma, "value", &cross, "fast")?;
    s.create_connection(&slow_ma, "value", &cross, "slow")?;
    s.create_connection(&cross, "cross_up", &buy, "trigger")?;
    s.create_connection(&cross, "cross_down", &sell, "trigger")?;

    Ok(s)
}

/// Buy while RSI is below `oversold`, sell while it is above `overbought`.
pub fn rsi_reversal(
    catalog: &Catalog,
    name: &str,
    symbol: &str,
    timeframe: &str,
    period: usize,
    oversold: f64,
    overbought: f64,
) -> Result<Strategy, DocumentError> {
    let mut s = Strategy::new(name, symbol, timeframe);

    let rsi = add(&mut s, catalog, "rsi", 0.0, 60.0)?;
    s.update_block_parameter(&rsi, "period", period as f64)?;

    let low = add(&mut s, catalog, "threshold", 240.0, 0.0)?;
    s.update_block_parameter(&low, "operator", "<")?;
    s.update_block_parameter(&low, "threshold", oversold)?;

    let high = add(&mut s, catalog, "threshold", 240.0, 120.0)?;
    s.update_block_parameter(&high, "operator", ">")?;
    s.update_block_parameter(&high, "threshold", overbought)?;

    let buy = add(&mut s, catalog, "buy", 480.0, 0.0)?;
    let sell = add(&mut s, catalog, "sell", 480.0, 120.0)?;

    s.create_connection(&rsi, "value", &low, "value")?;
    s.create_connection(&rsi, "value", &high, "value")?;
    s.create_connection(&low, "result", &buy, "trigger")?;
    s.create_connection(&high, "result", &sell, "trigger")?;

    Ok(s)
}

/// Buy after the close has held above the upper band for `bars` candles,
/// stop out when it falls below the lower band, and take profit when it
/// crosses back under the middle band.
pub fn bollinger_breakout(
    catalog: &Catalog,
    name: &str,
    symbol: &str,
    timeframe: &str,
    period: usize,
    bars: usize,
) -> Result<Strategy, DocumentError> {
    let mut s = Strategy::new(name, symbol, timeframe);

    let price = add(&mut s, catalog, "price", 0.0, 0.0)?;
    let bands = add(&mut s, catalog, "bollinger", 0.0, 160.0)?;
    s.update_block_parameter(&bands, "period", period as f64)?;

    let above = add(&mut s, catalog, "compare", 240.0, 0.0)?;
    s.update_block_parameter(&above, "operator", ">")?;
    let held = add(&mut s, catalog, "consecutive", 400.0, 0.0)?;
    s.update_block_parameter(&held, "bars", bars as f64)?;

    let below = add(&mut s, catalog, "compare", 240.0, 120.0)?;
    s.update_block_parameter(&below, "operator", "<")?;

    let back_in = add(&mut s, catalog, "crossover", 240.0, 240.0)?;

    let buy = add(&mut s, catalog, "buy", 560.0, 0.0)?;
    let stop = add(&mut s, catalog, "stop_loss", 560.0, 120.0)?;
    let target = add(&mut s, catalog, "take_profit", 560.0, 240.0)?;

    s.create_connection(&price, "close", &above, "a")?;
    s.create_connection(&bands, "upper", &above, "b")?;
    s.create_connection(&above, "result", &held, "condition")?;
    s.create_connection(&held, "result", &buy, "trigger")?;

    s.create_connection(&price, "close", &below, "a")?;
    s.create_connection(&bands, "lower", &below, "b")?;
    s.create_connection(&below, "result", &stop, "trigger")?;

    s.create_connection(&price, "close", &back_in, "fast")?;
    s.create_connection(&bands, "middle", &back_in, "slow")?;
    s.create_connection(&back_in, "cross_down", &target, "trigger")?;

    Ok(s)
}

/// Build a template by name with its default parameters.
pub fn by_name(
    catalog: &Catalog,
    template: &str,
    symbol: &str,
    timeframe: &str,
) -> Option<Result<Strategy, DocumentError>> {
    match template {
        "ma_crossover" => Some(ma_crossover(catalog, "MA Crossover 10/30", symbol, timeframe, 10, 30)),
        "rsi_reversal" => Some(rsi_reversal(catalog, "RSI Reversal 14", symbol, timeframe, 14, 30.0, 70.0)),
        "bollinger_breakout" => Some(bollinger_breakout(catalog, "Bollinger Breakout 20", symbol, timeframe, 20, 2)),
        _ => None,
    }
}
