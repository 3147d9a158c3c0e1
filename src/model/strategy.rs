use std::collections::HashMap;

use chrono::{DateTime, Utc};
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use uuid::Uuid;

use crate::catalog::Catalog;

use super::block::{BlockId, BlockInstance, Placement};
use super::connection::{Connection, ConnectionId};
use super::error::DocumentError;
use super::param::ParamValue;

/// A unique identifier for a strategy.
pub type StrategyId = String;

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A strategy document: block instances wired together by connections,
/// scoped to one symbol and timeframe.
///
/// Blocks and connections are only reachable through the mutation methods
/// below, each of which checks its invariants before touching anything.
#[derive(Debug, Clone)]
pub struct Strategy {
    pub id: StrategyId,
    pub name: String,
    pub symbol: String,
    pub timeframe: String,
    pub enabled: bool,
    /// Bumped by every successful mutation.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    blocks: Vec<BlockInstance>,
    connections: Vec<Connection>,
}

impl Strategy {
    pub fn new(name: &str, symbol: &str, timeframe: &str) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
            enabled: true,
            version: 0,
            created_at: now,
            updated_at: now,
            blocks: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Blocks in document order.
    pub fn blocks(&self) -> &[BlockInstance] {
        &self.blocks
    }

    /// Connections in creation order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn block(&self, block_id: &str) -> Option<&BlockInstance> {
        self.blocks.iter().find(|b| b.id == block_id)
    }

    pub fn connection(&self, connection_id: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == connection_id)
    }

    /// The connection currently bound to an input port, if any.
    pub fn connection_into(&self, block_id: &str, port_id: &str) -> Option<&Connection> {
        let bound = self.block(block_id)?.input(port_id)?.bound.as_deref()?;
        self.connection(bound)
    }

    fn block_mut(&mut self, block_id: &str) -> Result<&mut BlockInstance, DocumentError> {
        self.blocks
            .iter_mut()
            .find(|b| b.id == block_id)
            .ok_or_else(|| DocumentError::UnknownBlock {
                block_id: block_id.to_string(),
            })
    }

    fn require_block(&self, block_id: &str) -> Result<&BlockInstance, DocumentError> {
        self.block(block_id).ok_or_else(|| DocumentError::UnknownBlock {
            block_id: block_id.to_string(),
        })
    }

    fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }

    // ── Blocks ──────────────────────────────────────────────────────

    /// Instantiate a catalog template and append it to the document.
    pub fn add_block(
        &mut self,
        catalog: &Catalog,
        block_type: &str,
        placement: Placement,
    ) -> Result<&BlockInstance, DocumentError> {
        let template = catalog
            .template(block_type)
            .ok_or_else(|| DocumentError::UnknownTemplate {
                block_type: block_type.to_string(),
            })?;
        let block = BlockInstance::from_template(template, new_id(), placement);
        self.blocks.push(block);
        self.touch();
        let idx = self.blocks.len() - 1;
        Ok(&self.blocks[idx])
    }

    /// Set a parameter value. The value must fit the parameter's declared
    /// kind; numeric bounds are deliberately not enforced.
    pub fn update_block_parameter(
        &mut self,
        block_id: &str,
        name: &str,
        value: impl Into<ParamValue>,
    ) -> Result<(), DocumentError> {
        let value = value.into();
        let block = self.block_mut(block_id)?;
        let spec = block
            .param_spec(name)
            .ok_or_else(|| DocumentError::UnknownParameter {
                block_id: block_id.to_string(),
                name: name.to_string(),
            })?;
        if !spec.kind.accepts(&value) {
            return Err(DocumentError::InvalidParameterValue {
                block_id: block_id.to_string(),
                name: name.to_string(),
                expected: spec.kind.label(),
            });
        }
        block.values.insert(name.to_string(), value);
        self.touch();
        Ok(())
    }

    pub fn set_block_enabled(&mut self, block_id: &str, enabled: bool) -> Result<(), DocumentError> {
        self.block_mut(block_id)?.enabled = enabled;
        self.touch();
        Ok(())
    }

    pub fn move_block(&mut self, block_id: &str, placement: Placement) -> Result<(), DocumentError> {
        self.block_mut(block_id)?.placement = placement;
        self.touch();
        Ok(())
    }

    /// Remove a block and every connection touching it.
    /// Returns the ids of the removed connections.
    pub fn remove_block(&mut self, block_id: &str) -> Result<Vec<ConnectionId>, DocumentError> {
        let pos = self
            .blocks
            .iter()
            .position(|b| b.id == block_id)
            .ok_or_else(|| DocumentError::UnknownBlock {
                block_id: block_id.to_string(),
            })?;
        self.blocks.remove(pos);

        let (removed, kept): (Vec<Connection>, Vec<Connection>) = self
            .connections
            .drain(..)
            .partition(|c| c.touches(block_id));
        self.connections = kept;

        for conn in &removed {
            if let Some(port) = self
                .blocks
                .iter_mut()
                .find(|b| b.id == conn.target_block)
                .and_then(|b| b.input_mut(&conn.target_port))
            {
                port.bound = None;
            }
        }

        self.touch();
        Ok(removed.into_iter().map(|c| c.id).collect())
    }

    // ── Connections ─────────────────────────────────────────────────

    /// Wire `from_block.from_port` (an output) to `to_block.to_port` (an input).
    ///
    /// If the input is already bound, the previous connection is removed
    /// and replaced by this one.
    pub fn create_connection(
        &mut self,
        from_block: &str,
        from_port: &str,
        to_block: &str,
        to_port: &str,
    ) -> Result<&Connection, DocumentError> {
        let source = self.require_block(from_block)?;
        let target = self.require_block(to_block)?;

        let source_kind = source
            .output(from_port)
            .ok_or_else(|| DocumentError::UnknownPort {
                block_id: from_block.to_string(),
                port_id: from_port.to_string(),
                direction: "output",
            })?
            .kind;
        let input = target.input(to_port).ok_or_else(|| DocumentError::UnknownPort {
            block_id: to_block.to_string(),
            port_id: to_port.to_string(),
            direction: "input",
        })?;
        let target_kind = input.spec.kind;
        let replaced = input.bound.clone();

        if !source_kind.compatible_with(target_kind) {
            return Err(DocumentError::TypeMismatch {
                from_block: from_block.to_string(),
                from_port: from_port.to_string(),
                source_kind,
                to_block: to_block.to_string(),
                to_port: to_port.to_string(),
                target_kind,
            });
        }

        if self.reaches(to_block, from_block) {
            return Err(DocumentError::CyclicGraph {
                from_block: from_block.to_string(),
                to_block: to_block.to_string(),
            });
        }

        if let Some(old) = replaced {
            self.connections.retain(|c| c.id != old);
        }

        let connection = Connection {
            id: new_id(),
            source_block: from_block.to_string(),
            source_port: from_port.to_string(),
            target_block: to_block.to_string(),
            target_port: to_port.to_string(),
        };
        let id = connection.id.clone();
        if let Some(port) = self.block_mut(to_block)?.input_mut(to_port) {
            port.bound = Some(id);
        }
        self.connections.push(connection);
        self.touch();

        let idx = self.connections.len() - 1;
        Ok(&self.connections[idx])
    }

    /// Remove a connection and clear its target port's bound marker.
    pub fn remove_connection(&mut self, connection_id: &str) -> Result<Connection, DocumentError> {
        let pos = self
            .connections
            .iter()
            .position(|c| c.id == connection_id)
            .ok_or_else(|| DocumentError::UnknownConnection {
                connection_id: connection_id.to_string(),
            })?;
        let removed = self.connections.remove(pos);
        if let Some(port) = self
            .blocks
            .iter_mut()
            .find(|b| b.id == removed.target_block)
            .and_then(|b| b.input_mut(&removed.target_port))
        {
            port.bound = None;
        }
        self.touch();
        Ok(removed)
    }

    /// Wire two ports with no checks at all. Lets compiler tests build
    /// graphs the public operations refuse to.
    #[cfg(test)]
    pub(crate) fn wire_unchecked(&mut self, from: (&str, &str), to: (&str, &str)) {
        let connection = Connection {
            id: new_id(),
            source_block: from.0.to_string(),
            source_port: from.1.to_string(),
            target_block: to.0.to_string(),
            target_port: to.1.to_string(),
        };
        if let Some(port) = self
            .blocks
            .iter_mut()
            .find(|b| b.id == to.0)
            .and_then(|b| b.input_mut(to.1))
        {
            port.bound = Some(connection.id.clone());
        }
        self.connections.push(connection);
    }

    /// Whether `to` is reachable from `from` along existing connections.
    /// A block always reaches itself.
    fn reaches(&self, from: &str, to: &str) -> bool {
        let mut graph = DiGraph::<&str, ()>::new();
        let mut index: HashMap<&str, NodeIndex> = HashMap::new();
        for block in &self.blocks {
            index.insert(block.id.as_str(), graph.add_node(block.id.as_str()));
        }
        for conn in &self.connections {
            if let (Some(&a), Some(&b)) = (
                index.get(conn.source_block.as_str()),
                index.get(conn.target_block.as_str()),
            ) {
                graph.add_edge(a, b, ());
            }
        }
        match (index.get(from), index.get(to)) {
            (Some(&a), Some(&b)) => has_path_connecting(&graph, a, b, None),
            _ => false,
        }
    }
}
