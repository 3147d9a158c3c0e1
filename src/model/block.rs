use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::param::{ParamSpec, ParamValue};
use super::port::{InputPort, PortSpec};

/// A unique identifier for a block within a strategy.
pub type BlockId = String;

/// Broad role of a block in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum BlockCategory {
    /// Window statistics over the candle series.
    Indicator,
    /// Comparisons and edge detection producing booleans.
    Condition,
    /// Boolean algebra and run-length counting.
    Logic,
    /// Terminal blocks whose trigger emits an execution signal.
    Action,
    /// Constants and arithmetic.
    Variable,
}

impl BlockCategory {
    pub const ALL: [BlockCategory; 5] = [
        BlockCategory::Indicator,
        BlockCategory::Condition,
        BlockCategory::Logic,
        BlockCategory::Variable,
        BlockCategory::Action,
    ];
}

impl std::fmt::Display for BlockCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BlockCategory::Indicator => "indicator",
            BlockCategory::Condition => "condition",
            BlockCategory::Logic => "logic",
            BlockCategory::Action => "action",
            BlockCategory::Variable => "variable",
        };
        f.write_str(s)
    }
}

/// Immutable block definition registered in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BlockTemplate {
    /// Stable type id, e.g. "sma" or "crossover".
    #[serde(rename = "type")]
    pub block_type: String,
    pub category: BlockCategory,
    pub description: String,
    pub parameters: Vec<ParamSpec>,
    pub inputs: Vec<PortSpec>,
    pub outputs: Vec<PortSpec>,
}

/// Editor placement. Carried through export/import, ignored by execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
}

impl Placement {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A block placed in a strategy.
///
/// Parameter schema and ports are copied from the template at creation,
/// so the instance is independent of later catalog changes.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockInstance {
    pub id: BlockId,
    pub block_type: String,
    pub category: BlockCategory,
    pub enabled: bool,
    pub placement: Placement,
    pub params: Vec<ParamSpec>,
    pub values: BTreeMap<String, ParamValue>,
    pub inputs: Vec<InputPort>,
    pub outputs: Vec<PortSpec>,
}

impl BlockInstance {
    pub fn from_template(template: &BlockTemplate, id: BlockId, placement: Placement) -> Self {
        let values = template
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.default.clone()))
            .collect();

        Self {
            id,
            block_type: template.block_type.clone(),
            category: template.category,
            enabled: true,
            placement,
            params: template.parameters.clone(),
            values,
            inputs: template.inputs.iter().cloned().map(InputPort::from).collect(),
            outputs: template.outputs.clone(),
        }
    }

    pub fn is_action(&self) -> bool {
        self.category == BlockCategory::Action
    }

    pub fn param_spec(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Current value of a parameter, falling back to the schema default.
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.values
            .get(name)
            .or_else(|| self.param_spec(name).map(|p| &p.default))
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.param(name).and_then(ParamValue::as_number)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.param(name).and_then(ParamValue::as_text)
    }

    pub fn input(&self, port_id: &str) -> Option<&InputPort> {
        self.inputs.iter().find(|p| p.spec.id == port_id)
    }

    pub fn input_mut(&mut self, port_id: &str) -> Option<&mut InputPort> {
        self.inputs.iter_mut().find(|p| p.spec.id == port_id)
    }

    pub fn output(&self, port_id: &str) -> Option<&PortSpec> {
        self.outputs.iter().find(|p| p.id == port_id)
    }
}
