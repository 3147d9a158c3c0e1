use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::block::BlockId;
use super::port::PortId;

/// A unique identifier for a connection within a strategy.
pub type ConnectionId = String;

/// A directed wire from one block's output port to another block's input port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Connection {
    pub id: ConnectionId,
    /// Block producing the value.
    pub source_block: BlockId,
    /// Output port on the source block.
    pub source_port: PortId,
    /// Block consuming the value.
    pub target_block: BlockId,
    /// Input port on the target block.
    pub target_port: PortId,
}

impl Connection {
    /// Whether either endpoint is the given block.
    pub fn touches(&self, block_id: &str) -> bool {
        self.source_block == block_id || self.target_block == block_id
    }
}
