use thiserror::Error;

use super::port::ValueKind;

/// Rejection of a strategy document mutation. The document is unchanged
/// whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DocumentError {
    #[error("Unknown block type `{block_type}`")]
    UnknownTemplate { block_type: String },

    #[error("Unknown block `{block_id}`")]
    UnknownBlock { block_id: String },

    #[error("Block `{block_id}` has no parameter `{name}`")]
    UnknownParameter { block_id: String, name: String },

    #[error("Parameter `{name}` on block `{block_id}` expects {expected}")]
    InvalidParameterValue {
        block_id: String,
        name: String,
        expected: String,
    },

    #[error("Block `{block_id}` has no {direction} port `{port_id}`")]
    UnknownPort {
        block_id: String,
        port_id: String,
        direction: &'static str,
    },

    #[error("Cannot connect {source_kind} output `{from_block}.{from_port}` to {target_kind} input `{to_block}.{to_port}`")]
    TypeMismatch {
        from_block: String,
        from_port: String,
        source_kind: ValueKind,
        to_block: String,
        to_port: String,
        target_kind: ValueKind,
    },

    #[error("Unknown connection `{connection_id}`")]
    UnknownConnection { connection_id: String },

    #[error("Connecting `{from_block}` to `{to_block}` would create a same-step cycle")]
    CyclicGraph { from_block: String, to_block: String },
}
