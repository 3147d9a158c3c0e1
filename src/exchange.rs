use std::collections::{BTreeMap, HashMap};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::model::{
    BlockId, ConnectionId, DocumentError, ParamValue, Placement, Strategy,
};
use crate::validate::{self, ValidationError};

fn default_true() -> bool {
    true
}

/// Portable form of a strategy: what `export` writes and `import` reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StrategyDocument {
    /// Human-readable strategy name.
    pub name: String,
    /// Instrument the strategy trades, e.g. "BTC/USDT".
    pub symbol: String,
    /// Candle timeframe, e.g. "1h".
    pub timeframe: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Blocks in document order.
    #[serde(default)]
    pub blocks: Vec<BlockRecord>,
    /// Connections between block ports.
    #[serde(default)]
    pub connections: Vec<ConnectionRecord>,
}

/// One block instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BlockRecord {
    /// Id used by connections in this document. Replaced on import.
    pub id: BlockId,
    /// Catalog type id, e.g. "sma".
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Parameter overrides. Omitted parameters take the catalog default.
    #[serde(default)]
    pub parameters: BTreeMap<String, ParamValue>,
    #[serde(default)]
    pub placement: Placement,
}

/// A wire from an output port to an input port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConnectionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ConnectionId>,
    pub source_block: BlockId,
    pub source_port: String,
    pub target_block: BlockId,
    pub target_port: String,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid strategy document:\n  {}", format_errors(.0))]
    Invalid(Vec<ValidationError>),

    #[error("Rebuilding {context}: {source}")]
    Document {
        context: String,
        #[source]
        source: DocumentError,
    },
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n  ")
}

/// Snapshot a strategy into its portable form.
pub fn export(strategy: &Strategy) -> StrategyDocument {
    StrategyDocument {
        name: strategy.name.clone(),
        symbol: strategy.symbol.clone(),
        timeframe: strategy.timeframe.clone(),
        enabled: strategy.enabled,
        blocks: strategy
            .blocks()
            .iter()
            .map(|b| BlockRecord {
                id: b.id.clone(),
                block_type: b.block_type.clone(),
                enabled: b.enabled,
                parameters: b.values.clone(),
                placement: b.placement,
            })
            .collect(),
        connections: strategy
            .connections()
            .iter()
            .map(|c| ConnectionRecord {
                id: Some(c.id.clone()),
                source_block: c.source_block.clone(),
                source_port: c.source_port.clone(),
                target_block: c.target_block.clone(),
                target_port: c.target_port.clone(),
            })
            .collect(),
    }
}

pub fn to_json(strategy: &Strategy) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&export(strategy))
}

/// Build a new strategy from a document.
///
/// The document is validated as a whole first, then replayed through the
/// regular document operations on a fresh strategy, so every id (strategy,
/// blocks, connections) is newly minted.
pub fn import(catalog: &Catalog, doc: &StrategyDocument) -> Result<Strategy, ImportError> {
    validate::validate(catalog, doc).map_err(ImportError::Invalid)?;

    let mut strategy = Strategy::new(&doc.name, &doc.symbol, &doc.timeframe);
    strategy.enabled = doc.enabled;

    let mut ids: HashMap<&str, BlockId> = HashMap::new();
    for record in &doc.blocks {
        let rebuild = |source: DocumentError| ImportError::Document {
            context: format!("block `{}`", record.id),
            source,
        };
        let new_id = strategy
            .add_block(catalog, &record.block_type, record.placement)
            .map_err(rebuild)?
            .id
            .clone();
        for (name, value) in &record.parameters {
            strategy
                .update_block_parameter(&new_id, name, value.clone())
                .map_err(rebuild)?;
        }
        if !record.enabled {
            strategy
                .set_block_enabled(&new_id, false)
                .map_err(rebuild)?;
        }
        ids.insert(record.id.as_str(), new_id);
    }

    for (i, record) in doc.connections.iter().enumerate() {
        let rebuild = |source: DocumentError| ImportError::Document {
            context: format!("connection #{i}"),
            source,
        };
        let missing = |block_id: &str| DocumentError::UnknownBlock {
            block_id: block_id.to_string(),
        };
        let from = ids
            .get(record.source_block.as_str())
            .ok_or_else(|| rebuild(missing(record.source_block.as_str())))?;
        let to = ids
            .get(record.target_block.as_str())
            .ok_or_else(|| rebuild(missing(record.target_block.as_str())))?;
        strategy
            .create_connection(from, &record.source_port, to, &record.target_port)
            .map_err(rebuild)?;
    }

    Ok(strategy)
}

pub fn from_json(catalog: &Catalog, json: &str) -> Result<Strategy, ImportError> {
    let doc: StrategyDocument = serde_json::from_str(json)?;
    import(catalog, &doc)
}
