use std::collections::HashMap;

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::exchange::StrategyDocument;

use super::ValidationError;

/// Build a petgraph DiGraph from the document and check for cycles and
/// self-loops. Values only flow backwards in time through the previous-step
/// window, never through a connection, so any cycle is an error.
pub fn check_dag(doc: &StrategyDocument) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut graph = DiGraph::<&str, ()>::new();
    let mut index_map: HashMap<&str, NodeIndex> = HashMap::new();

    for block in &doc.blocks {
        let id = block.id.as_str();
        index_map.entry(id).or_insert_with(|| graph.add_node(id));
    }

    for conn in &doc.connections {
        if conn.source_block == conn.target_block {
            errors.push(ValidationError::SelfLoop {
                block_id: conn.source_block.clone(),
            });
            continue;
        }

        if let (Some(&from_idx), Some(&to_idx)) = (
            index_map.get(conn.source_block.as_str()),
            index_map.get(conn.target_block.as_str()),
        ) {
            graph.add_edge(from_idx, to_idx, ());
        }
        // Missing block references are caught by references.rs
    }

    if is_cyclic_directed(&graph) {
        errors.push(ValidationError::CycleDetected);
    }

    errors
}
