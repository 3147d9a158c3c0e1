use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::connection::ConnectionId;

/// Identifier of a port, unique within one block.
pub type PortId = String;

/// The kind of value a port carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Number,
    Boolean,
    Candle,
    Signal,
    /// Wildcard: compatible with every other kind.
    Any,
}

impl ValueKind {
    /// Two ports may be wired together when their kinds match exactly
    /// or either side is `Any`.
    pub fn compatible_with(self, other: ValueKind) -> bool {
        self == other || self == ValueKind::Any || other == ValueKind::Any
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ValueKind::Number => "number",
            ValueKind::Boolean => "boolean",
            ValueKind::Candle => "candle",
            ValueKind::Signal => "signal",
            ValueKind::Any => "any",
        };
        f.write_str(s)
    }
}

/// Port schema as declared by a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PortSpec {
    pub id: PortId,
    pub label: String,
    pub kind: ValueKind,
}

impl PortSpec {
    pub fn new(id: &str, label: &str, kind: ValueKind) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind,
        }
    }
}

/// An input port owned by a block instance. `bound` names the single
/// connection currently feeding it.
#[derive(Debug, Clone, PartialEq)]
pub struct InputPort {
    pub spec: PortSpec,
    pub bound: Option<ConnectionId>,
}

impl InputPort {
    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }
}

impl From<PortSpec> for InputPort {
    fn from(spec: PortSpec) -> Self {
        Self { spec, bound: None }
    }
}
