use std::collections::HashSet;

use crate::catalog::Catalog;
use crate::exchange::StrategyDocument;

use super::ValidationError;

/// Check that all block IDs are unique.
pub fn check_duplicate_ids(doc: &StrategyDocument) -> Vec<ValidationError> {
    let mut seen = HashSet::new();
    let mut errors = Vec::new();

    for block in &doc.blocks {
        if !seen.insert(block.id.as_str()) {
            errors.push(ValidationError::DuplicateBlockId {
                block_id: block.id.clone(),
            });
        }
    }

    errors
}

/// Check that every block type exists in the catalog.
pub fn check_block_types(catalog: &Catalog, doc: &StrategyDocument) -> Vec<ValidationError> {
    doc.blocks
        .iter()
        .filter(|b| !catalog.contains(&b.block_type))
        .map(|b| ValidationError::UnknownBlockType {
            block_id: b.id.clone(),
            block_type: b.block_type.clone(),
        })
        .collect()
}

/// Check that every connection references existing blocks.
pub fn check_connection_references(doc: &StrategyDocument) -> Vec<ValidationError> {
    let block_ids: HashSet<&str> = doc.blocks.iter().map(|b| b.id.as_str()).collect();
    let mut errors = Vec::new();

    for conn in &doc.connections {
        if !block_ids.contains(conn.source_block.as_str()) {
            errors.push(ValidationError::UnknownBlock {
                block_id: conn.source_block.clone(),
            });
        }
        if !block_ids.contains(conn.target_block.as_str()) {
            errors.push(ValidationError::UnknownBlock {
                block_id: conn.target_block.clone(),
            });
        }
    }

    errors
}
