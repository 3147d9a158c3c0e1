use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::exchange::{BlockRecord, StrategyDocument};
use crate::model::BlockTemplate;

use super::ValidationError;

/// Check parameter names and value kinds against each block's template.
/// Numeric bounds are not checked.
pub fn check_parameters(catalog: &Catalog, doc: &StrategyDocument) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for block in &doc.blocks {
        let Some(template) = catalog.template(&block.block_type) else {
            continue; // caught by reference checks
        };
        for (name, value) in &block.parameters {
            match template.parameters.iter().find(|p| &p.name == name) {
                None => errors.push(ValidationError::UnknownParameter {
                    block_id: block.id.clone(),
                    name: name.clone(),
                }),
                Some(spec) if !spec.kind.accepts(value) => {
                    errors.push(ValidationError::InvalidParameterValue {
                        block_id: block.id.clone(),
                        name: name.clone(),
                        expected: spec.kind.label(),
                    })
                }
                Some(_) => {}
            }
        }
    }

    errors
}

/// Check that every connection joins an existing output port to an
/// existing input port of a compatible kind.
pub fn check_connection_ports(catalog: &Catalog, doc: &StrategyDocument) -> Vec<ValidationError> {
    let blocks: HashMap<&str, (&BlockRecord, &BlockTemplate)> = doc
        .blocks
        .iter()
        .filter_map(|b| catalog.template(&b.block_type).map(|t| (b.id.as_str(), (b, t))))
        .collect();
    let mut errors = Vec::new();

    for conn in &doc.connections {
        let (Some((src, src_t)), Some((dst, dst_t))) = (
            blocks.get(conn.source_block.as_str()),
            blocks.get(conn.target_block.as_str()),
        ) else {
            continue;
        };

        let output = src_t.outputs.iter().find(|p| p.id == conn.source_port);
        let input = dst_t.inputs.iter().find(|p| p.id == conn.target_port);

        if output.is_none() {
            errors.push(ValidationError::UnknownPort {
                block_id: src.id.clone(),
                block_type: src.block_type.clone(),
                port_id: conn.source_port.clone(),
                direction: "output",
            });
        }
        if input.is_none() {
            errors.push(ValidationError::UnknownPort {
                block_id: dst.id.clone(),
                block_type: dst.block_type.clone(),
                port_id: conn.target_port.clone(),
                direction: "input",
            });
        }

        if let (Some(out), Some(inp)) = (output, input) {
            if !out.kind.compatible_with(inp.kind) {
                errors.push(ValidationError::KindMismatch {
                    from_block: src.id.clone(),
                    from_port: out.id.clone(),
                    source_kind: out.kind,
                    to_block: dst.id.clone(),
                    to_port: inp.id.clone(),
                    target_kind: inp.kind,
                });
            }
        }
    }

    errors
}
