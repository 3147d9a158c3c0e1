use anyhow::{Result, anyhow};

use crate::catalog::Catalog;
use crate::exchange;
use crate::templates::{self, TEMPLATE_NAMES};

/// Print a template strategy as a JSON document to stdout.
pub fn run(catalog: &Catalog, template: &str, symbol: &str, timeframe: &str) -> Result<()> {
    let strategy = templates::by_name(catalog, template, symbol, timeframe)
        .ok_or_else(|| {
            anyhow!(
                "Unknown template `{template}`. Available: {}",
                TEMPLATE_NAMES.join(", ")
            )
        })??;
    println!("{}", exchange::to_json(&strategy)?);
    Ok(())
}
