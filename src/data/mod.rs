use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::model::Candle;

/// Load candles from a CSV file with `time,open,high,low,close,volume`
/// headers and check they are time-ascending.
pub fn load_candles(path: &Path) -> Result<Vec<Candle>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("opening CSV file {}", path.display()))?;
    let candles: Vec<Candle> = rdr
        .deserialize()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("parsing CSV file {}", path.display()))?;
    check_ordering(&candles).with_context(|| format!("checking {}", path.display()))?;
    Ok(candles)
}

/// Candles must be strictly time-ascending. Gaps are not checked.
pub fn check_ordering(candles: &[Candle]) -> Result<()> {
    for (i, pair) in candles.windows(2).enumerate() {
        if pair[1].time <= pair[0].time {
            bail!(
                "candle {} (time {}) is not after candle {} (time {})",
                i + 1,
                pair[1].time,
                i,
                pair[0].time
            );
        }
    }
    Ok(())
}

/// Flat candles from a list of closes, one `step` seconds apart.
pub fn from_closes(closes: &[f64], start: u64, step: u64) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Candle::flat(start + i as u64 * step, close))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_load_candles_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "time,open,high,low,close,volume").unwrap();
        writeln!(file, "60,1.0,2.0,0.5,1.5,100").unwrap();
        writeln!(file, "120,1.5,2.5,1.0,2.0,80").unwrap();
        file.flush().unwrap();

        let candles = load_candles(file.path()).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[1].time, 120);
        assert_eq!(candles[1].close, 2.0);
    }

    #[test]
    fn test_out_of_order_rejected() {
        let candles = from_closes(&[1.0, 2.0, 3.0], 0, 60);
        assert!(check_ordering(&candles).is_ok());

        let mut bad = candles.clone();
        bad.swap(1, 2);
        assert!(check_ordering(&bad).is_err());
    }
}
