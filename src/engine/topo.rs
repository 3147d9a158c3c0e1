use std::collections::HashSet;

use crate::model::{BlockId, Strategy};

use super::CompileError;

/// Compute the execution order of a strategy's blocks.
///
/// Depth-first from every action block in document order, emitting the
/// source of each bound input before the block itself. Blocks no action
/// depends on are swept afterwards, again in document order, so their
/// values are still computed every step.
pub fn execution_order(
    strategy: &Strategy,
    max_depth: usize,
) -> Result<Vec<BlockId>, CompileError> {
    let mut visit = Visit {
        strategy,
        max_depth,
        emitted: HashSet::new(),
        on_stack: HashSet::new(),
        order: Vec::with_capacity(strategy.blocks().len()),
    };

    for block in strategy.blocks().iter().filter(|b| b.is_action()) {
        visit.visit(&block.id, 0)?;
    }
    for block in strategy.blocks() {
        visit.visit(&block.id, 0)?;
    }

    Ok(visit.order)
}

struct Visit<'a> {
    strategy: &'a Strategy,
    max_depth: usize,
    emitted: HashSet<&'a str>,
    on_stack: HashSet<&'a str>,
    order: Vec<BlockId>,
}

impl<'a> Visit<'a> {
    fn visit(&mut self, block_id: &'a str, depth: usize) -> Result<(), CompileError> {
        if self.emitted.contains(block_id) {
            return Ok(());
        }
        if depth > self.max_depth {
            return Err(CompileError::DepthLimit {
                block_id: block_id.to_string(),
                max_depth: self.max_depth,
            });
        }
        if !self.on_stack.insert(block_id) {
            return Err(CompileError::CyclicGraph {
                block_id: block_id.to_string(),
            });
        }

        let strategy = self.strategy;
        if let Some(block) = strategy.block(block_id) {
            for input in &block.inputs {
                let source = input
                    .bound
                    .as_deref()
                    .and_then(|id| strategy.connection(id));
                if let Some(conn) = source {
                    self.visit(&conn.source_block, depth + 1)?;
                }
            }
        }

        self.on_stack.remove(block_id);
        self.emitted.insert(block_id);
        self.order.push(block_id.to_string());
        Ok(())
    }
}
