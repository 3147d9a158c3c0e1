use crate::catalog::Catalog;
use crate::model::{BlockCategory, BlockTemplate, ParamValue};

/// Print a human-readable listing of every block type in the catalog,
/// grouped by category.
pub fn run(catalog: &Catalog) -> anyhow::Result<()> {
    print!("{}", render(catalog));
    Ok(())
}

pub fn render(catalog: &Catalog) -> String {
    let mut out = String::from("Available Block Types\n=====================\n");
    let mut n = 0;
    for category in BlockCategory::ALL {
        let templates: Vec<&BlockTemplate> = catalog.by_category(category).collect();
        if templates.is_empty() {
            continue;
        }
        out.push_str(&format!("\n── {category} ──\n"));
        for t in templates {
            n += 1;
            out.push_str(&format!("\n{n}. {}\n   {}\n", t.block_type, t.description));
            if !t.parameters.is_empty() {
                out.push_str("   Parameters:\n");
                for p in &t.parameters {
                    let bounds = match (p.min, p.max) {
                        (Some(lo), Some(hi)) => format!(", range {lo}..{hi}"),
                        _ => String::new(),
                    };
                    out.push_str(&format!(
                        "     - {:<12} {} (default {}{bounds})\n",
                        p.name,
                        p.kind.label(),
                        display_value(&p.default)
                    ));
                }
            }
            if !t.inputs.is_empty() {
                out.push_str("   Inputs:\n");
                for port in &t.inputs {
                    out.push_str(&format!("     - {:<12} {}\n", port.id, port.kind));
                }
            }
            if !t.outputs.is_empty() {
                out.push_str("   Outputs:\n");
                for port in &t.outputs {
                    out.push_str(&format!("     - {:<12} {}\n", port.id, port.kind));
                }
            }
        }
    }
    out
}

fn display_value(v: &ParamValue) -> String {
    match v {
        ParamValue::Number(n) => n.to_string(),
        ParamValue::Boolean(b) => b.to_string(),
        ParamValue::Text(s) => format!("\"{s}\""),
    }
}
