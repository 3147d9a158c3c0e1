mod graph;
mod ports;
mod references;

use std::path::Path;

use thiserror::Error;

use crate::catalog::Catalog;
use crate::exchange::StrategyDocument;
use crate::model::ValueKind;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate block ID `{block_id}`")]
    DuplicateBlockId { block_id: String },

    #[error("Block `{block_id}` has unknown type `{block_type}`")]
    UnknownBlockType { block_id: String, block_type: String },

    #[error("Connection references unknown block `{block_id}`")]
    UnknownBlock { block_id: String },

    #[error("Block `{block_id}` ({block_type}) has no {direction} port `{port_id}`")]
    UnknownPort {
        block_id: String,
        block_type: String,
        port_id: String,
        direction: &'static str,
    },

    #[error("Connection `{from_block}.{from_port}` -> `{to_block}.{to_port}` joins {source_kind} to {target_kind}")]
    KindMismatch {
        from_block: String,
        from_port: String,
        source_kind: ValueKind,
        to_block: String,
        to_port: String,
        target_kind: ValueKind,
    },

    #[error("Block `{block_id}` has no parameter `{name}`")]
    UnknownParameter { block_id: String, name: String },

    #[error("Parameter `{name}` on block `{block_id}` expects {expected}")]
    InvalidParameterValue {
        block_id: String,
        name: String,
        expected: String,
    },

    #[error("Self-loop on block `{block_id}`")]
    SelfLoop { block_id: String },

    #[error("Strategy contains a same-step cycle")]
    CycleDetected,
}

/// Load and fully validate a strategy document from a JSON file.
pub fn load_and_validate(
    catalog: &Catalog,
    path: &Path,
) -> Result<StrategyDocument, Vec<ValidationError>> {
    let contents = std::fs::read_to_string(path).map_err(|e| vec![ValidationError::Io(e)])?;
    let doc: StrategyDocument =
        serde_json::from_str(&contents).map_err(|e| vec![ValidationError::Json(e)])?;
    validate(catalog, &doc)?;
    Ok(doc)
}

/// Validate a document against the catalog, collecting all errors.
pub fn validate(catalog: &Catalog, doc: &StrategyDocument) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    errors.extend(references::check_duplicate_ids(doc));
    errors.extend(references::check_block_types(catalog, doc));
    errors.extend(references::check_connection_references(doc));
    errors.extend(ports::check_parameters(catalog, doc));
    errors.extend(ports::check_connection_ports(catalog, doc));
    errors.extend(graph::check_dag(doc));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// CLI entry point for the `validate` subcommand.
pub fn run(catalog: &Catalog, path: &Path) -> anyhow::Result<()> {
    match load_and_validate(catalog, path) {
        Ok(doc) => {
            println!(
                "Strategy '{}' ({} {}) is valid. {} blocks, {} connections.",
                doc.name,
                doc.symbol,
                doc.timeframe,
                doc.blocks.len(),
                doc.connections.len()
            );
            Ok(())
        }
        Err(errors) => {
            eprintln!("Validation failed with {} error(s):", errors.len());
            for (i, e) in errors.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, e);
            }
            std::process::exit(1);
        }
    }
}
